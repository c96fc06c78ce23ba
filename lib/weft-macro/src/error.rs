//! Weaving diagnostics.
//!
//! Every validation step returns [`Result`]; the first [`WeavingError`] aborts
//! the pass and becomes a single `compile_error!` for the whole module.

use std::fmt;

use proc_macro2::Span;

/// Result of a weaving step.
pub(crate) type Result<T> = std::result::Result<T, WeavingError>;

/// What a diagnostic is about, rendered as `(Type)` or `(Type.method)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scope {
    Type(String),
    Method(String, String),
}

impl Scope {
    /// Narrow a type scope to one of its methods.
    pub(crate) fn method(&self, method: impl fmt::Display) -> Self {
        match self {
            Self::Type(owner) | Self::Method(owner, _) => {
                Self::Method(owner.clone(), method.to_string())
            }
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(owner) => write!(f, "({owner})"),
            Self::Method(owner, method) => write!(f, "({owner}.{method})"),
        }
    }
}

/// A labeled weaving failure.
#[derive(Debug, Clone)]
pub(crate) struct WeavingError {
    scope: Scope,
    message: String,
    span: Span,
}

impl WeavingError {
    pub(crate) fn new(scope: &Scope, span: Span, message: impl Into<String>) -> Self {
        Self {
            scope: scope.clone(),
            message: message.into(),
            span,
        }
    }

    /// Relabel a syntax error raised while reading attribute arguments.
    pub(crate) fn from_syn(scope: &Scope, err: &syn::Error) -> Self {
        Self::new(scope, err.span(), err.to_string())
    }

    #[cfg(test)]
    pub(crate) fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for WeavingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.scope, self.message)
    }
}

impl From<WeavingError> for syn::Error {
    fn from(err: WeavingError) -> Self {
        Self::new(err.span, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        let scope = Scope::Type("UserApi".to_string());
        assert_eq!(scope.to_string(), "(UserApi)");
        assert_eq!(scope.method("get_user").to_string(), "(UserApi.get_user)");
    }

    #[test]
    fn converts_into_syn_error() {
        let scope = Scope::Type("UserApi".to_string()).method("get_user");
        let err = WeavingError::new(&scope, Span::call_site(), "Expected method to be extern.");

        let err = syn::Error::from(err);
        insta::assert_snapshot!(err, @"(UserApi.get_user) Expected method to be extern.");
    }
}
