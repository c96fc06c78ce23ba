//! Metadata extraction for contract methods.

use syn::spanned::Spanned;
use syn::{Attribute, Signature, Type};

use crate::attrs::{AttrArgs, HEADER_ATTR, HttpMethod, find_attrs, operation_attrs, parse_operation};
use crate::error::{Result, Scope, WeavingError};

/// Validated metadata of one contract method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MethodDescriptor {
    pub(crate) verb: HttpMethod,
    pub(crate) path: String,
    /// Static `#[header(name, value)]` pairs, in declaration order.
    pub(crate) headers: Vec<(String, String)>,
}

impl MethodDescriptor {
    /// Read the operation metadata of a method.
    ///
    /// Returns `Ok(None)` when the method has no operation attribute: it is not a
    /// contract method and stays untouched.
    pub(crate) fn extract(
        attrs: &[Attribute],
        sig: &Signature,
        has_body: bool,
        scope: &Scope,
    ) -> Result<Option<Self>> {
        let operations = operation_attrs(attrs);
        let operation = match operations.as_slice() {
            [] => return Ok(None),
            [operation] => *operation,
            [_, second, ..] => {
                return Err(WeavingError::new(
                    scope,
                    second.span(),
                    format!(
                        "Expected a single HTTP method attribute, but got {} instead.",
                        operations.len()
                    ),
                ));
            }
        };

        if has_body {
            return Err(WeavingError::new(
                scope,
                sig.span(),
                "Expected method to be extern.",
            ));
        }

        let (verb, path) = parse_operation(operation, scope)?;
        ensure_shared_receiver(sig, scope)?;

        let headers = find_attrs(attrs, HEADER_ATTR)
            .into_iter()
            .map(|attr| static_header(attr, scope))
            .collect::<Result<_>>()?;

        Ok(Some(Self {
            verb,
            path,
            headers,
        }))
    }
}

fn ensure_shared_receiver(sig: &Signature, scope: &Scope) -> Result<()> {
    let shared = sig.receiver().is_some_and(
        |receiver| matches!(receiver.ty.as_ref(), Type::Reference(reference) if reference.mutability.is_none()),
    );
    if shared {
        Ok(())
    } else {
        Err(WeavingError::new(
            scope,
            sig.span(),
            "Expected method to take `&self`.",
        ))
    }
}

fn static_header(attr: &Attribute, scope: &Scope) -> Result<(String, String)> {
    let args = AttrArgs::parse(attr, scope)?;
    if args.len() != 2 {
        return Err(WeavingError::new(
            scope,
            attr.span(),
            format!("Expected 2 parameters, but got {} instead.", args.len()),
        ));
    }
    match (args.string(0), args.string(1)) {
        (Some(name), Some(value)) => Ok((name, value)),
        _ => Err(WeavingError::new(
            scope,
            attr.span(),
            "Attribute parameters cannot be null.",
        )),
    }
}
