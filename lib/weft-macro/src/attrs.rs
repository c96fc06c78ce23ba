//! Attribute parsing for the weaver.
//!
//! weft attributes are inert markers read by `#[weave]` and stripped from its
//! output. Their arguments follow one model: a comma separated list where each
//! entry is a string literal or the null literal `None`.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Lit, LitStr, Meta, Path, Token};

use crate::error::{Result, Scope, WeavingError};

/// HTTP verb of a contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Canonical upper-case name, also the `http::Method` constant name.
    #[must_use]
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Parse an HTTP method from a string (case-insensitive).
    /// Returns `None` for unsupported methods.
    #[must_use]
    pub(crate) fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "DELETE" => Some(Self::Delete),
            "PATCH" => Some(Self::Patch),
            "HEAD" => Some(Self::Head),
            "OPTIONS" => Some(Self::Options),
            "TRACE" => Some(Self::Trace),
            _ => None,
        }
    }

    /// The verb attribute (`#[get]`, `#[post]`, ...) this method is declared with.
    fn from_attr(attr: &Attribute) -> Option<Self> {
        let ident = attr.path().get_ident()?.to_string();
        VERB_ATTRS
            .contains(&ident.as_str())
            .then(|| Self::parse(&ident))
            .flatten()
    }

    /// Expression yielding the verb at call time (e.g. `::weft::Method::GET`).
    pub(crate) fn accessor(self, krate: &Path) -> TokenStream {
        let name = syn::Ident::new(self.as_str(), Span::call_site());
        quote!(#krate::Method::#name)
    }
}

const VERB_ATTRS: &[&str] = &[
    "get", "post", "put", "delete", "patch", "head", "options", "trace",
];

/// The custom verb attribute, `#[http("VERB /path")]`.
pub(crate) const HTTP_ATTR: &str = "http";

/// Method-level static header, `#[header("Name", "value")]`.
pub(crate) const HEADER_ATTR: &str = "header";

// Parameter attributes, in binding precedence order (`#[header]` sits between
// `#[headers]` and `#[query]`).
pub(crate) const BODY_ATTR: &str = "body";
pub(crate) const HEADERS_ATTR: &str = "headers";
pub(crate) const QUERY_ATTR: &str = "query";
pub(crate) const ALIAS_ATTR: &str = "alias";

const PARAM_ATTRS: &[&str] = &[BODY_ATTR, HEADERS_ATTR, HEADER_ATTR, QUERY_ATTR, ALIAS_ATTR];

// Markers on functions the weaver looks up rather than rewrites.
pub(crate) const SERIALIZER_ATTR: &str = "serializer";
pub(crate) const DESERIALIZER_ATTR: &str = "deserializer";
pub(crate) const TRANSPORT_ATTR: &str = "transport";

const MARKER_ATTRS: &[&str] = &[SERIALIZER_ATTR, DESERIALIZER_ATTR, TRANSPORT_ATTR];

/// Returns `true` for `#[get]` .. `#[trace]` and `#[http]`.
pub(crate) fn is_operation_attr(attr: &Attribute) -> bool {
    HttpMethod::from_attr(attr).is_some() || attr.path().is_ident(HTTP_ATTR)
}

/// Operation attributes attached to a method.
pub(crate) fn operation_attrs(attrs: &[Attribute]) -> Vec<&Attribute> {
    attrs.iter().filter(|attr| is_operation_attr(attr)).collect()
}

/// Parse an operation attribute into its verb and path template.
pub(crate) fn parse_operation(attr: &Attribute, scope: &Scope) -> Result<(HttpMethod, String)> {
    let args = AttrArgs::parse(attr, scope)?;
    if args.len() > 1 {
        return Err(WeavingError::new(
            scope,
            attr.span(),
            format!("Expected 1 parameter, but got {} instead.", args.len()),
        ));
    }
    let Some(value) = args.string(0) else {
        return Err(WeavingError::new(
            scope,
            attr.span(),
            "Attribute parameters cannot be null.",
        ));
    };

    if let Some(method) = HttpMethod::from_attr(attr) {
        return Ok((method, value));
    }

    let (verb, path) = value.split_once(' ').ok_or_else(|| {
        WeavingError::new(
            scope,
            attr.span(),
            "expected format: \"METHOD /path\" (e.g., \"GET /users/{id}\")",
        )
    })?;
    let method = HttpMethod::parse(verb).ok_or_else(|| {
        WeavingError::new(
            scope,
            attr.span(),
            format!(
                "unsupported HTTP method: {verb}. Supported: GET, POST, PUT, DELETE, PATCH, HEAD, OPTIONS, TRACE"
            ),
        )
    })?;
    Ok((method, path.trim_start().to_string()))
}

/// Attributes with the given name, in declaration order.
pub(crate) fn find_attrs<'a>(attrs: &'a [Attribute], name: &str) -> Vec<&'a Attribute> {
    attrs.iter().filter(|attr| attr.path().is_ident(name)).collect()
}

/// Returns `true` if an attribute with the given name is present.
pub(crate) fn has_attr(attrs: &[Attribute], name: &str) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident(name))
}

/// Drop weaving attributes from a contract method.
pub(crate) fn strip_method_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !is_operation_attr(attr) && !attr.path().is_ident(HEADER_ATTR));
}

/// Drop binding attributes from a parameter.
pub(crate) fn strip_param_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !PARAM_ATTRS.iter().any(|name| attr.path().is_ident(name)));
}

/// Drop `#[serializer]`, `#[deserializer]` and `#[transport]` markers.
pub(crate) fn strip_marker_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !MARKER_ATTRS.iter().any(|name| attr.path().is_ident(name)));
}

/// One attribute argument.
#[derive(Debug, Clone)]
pub(crate) enum AttrArg {
    Str(LitStr),
    Null,
}

/// The arguments of one attribute.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttrArgs {
    args: Vec<AttrArg>,
}

impl AttrArgs {
    /// Read the arguments of `#[name]`, `#[name()]` or `#[name("a", None, ..)]`.
    pub(crate) fn parse(attr: &Attribute, scope: &Scope) -> Result<Self> {
        let list = match &attr.meta {
            Meta::Path(_) => return Ok(Self::default()),
            Meta::List(list) => list,
            Meta::NameValue(name_value) => {
                return Err(WeavingError::new(
                    scope,
                    name_value.span(),
                    "expected a list of string literals",
                ));
            }
        };

        let exprs = list
            .parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated)
            .map_err(|err| WeavingError::from_syn(scope, &err))?;

        let args = exprs
            .into_iter()
            .map(|expr| match expr {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(lit), ..
                }) => Ok(AttrArg::Str(lit)),
                Expr::Path(path) if path.qself.is_none() && path.path.is_ident("None") => {
                    Ok(AttrArg::Null)
                }
                other => Err(WeavingError::new(
                    scope,
                    other.span(),
                    "expected a string literal or `None`",
                )),
            })
            .collect::<Result<_>>()?;

        Ok(Self { args })
    }

    /// Number of arguments.
    pub(crate) fn len(&self) -> usize {
        self.args.len()
    }

    /// The string value at `index`, or `None` if absent or null.
    pub(crate) fn string(&self, index: usize) -> Option<String> {
        match self.args.get(index)? {
            AttrArg::Str(lit) => Some(lit.value()),
            AttrArg::Null => None,
        }
    }
}
