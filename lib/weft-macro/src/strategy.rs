//! Return strategy selection.

use quote::format_ident;
use syn::ext::IdentExt as _;
use syn::spanned::Spanned;
use syn::{Ident, ReturnType, Signature, Type};

use crate::error::{Result, Scope, WeavingError};
use crate::serializer::{Form, SerializerFn, SerializerPair};
use crate::types::{is_byte_sequence, is_named, is_string, is_unit_type, type_arguments, unwrap_named};

/// How a contract method hands its result back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReturnShape {
    /// `async fn .. -> weft::Result<T>`: the body awaits the task.
    Async,
    /// `fn .. -> weft::Task<'_, T>`: the body returns the task.
    Task,
}

/// What the response is turned into.
#[derive(Debug, Clone)]
pub(crate) enum ReturnStrategy {
    Void,
    RawString,
    RawStream,
    RawByteArray(Type),
    RawStatusCode,
    RawResponse,
    Deserialized { target: Type, via: SerializerFn },
}

/// The sibling method deserializing the raw content of a response.
#[derive(Debug, Clone)]
pub(crate) struct Continuation {
    pub(crate) name: Ident,
    pub(crate) target: Type,
    pub(crate) via: SerializerFn,
}

impl Continuation {
    /// Raw content the deserializer reads.
    pub(crate) const fn intermediate(&self) -> Form {
        self.via.form
    }
}

/// Selected return handling of one contract method.
#[derive(Debug, Clone)]
pub(crate) struct ReturnPlan {
    pub(crate) shape: ReturnShape,
    pub(crate) strategy: ReturnStrategy,
    pub(crate) continuation: Option<Continuation>,
}

/// Unwrap the declared asynchronous result type and pick a strategy.
///
/// Raw shapes are checked in priority order: `String`, `ByteStream`,
/// `Vec<u8>` or `Bytes`, `StatusCode`, `Response`. Anything else is
/// deserialized and needs a `#[deserializer]`.
pub(crate) fn select(sig: &Signature, serializers: &SerializerPair, scope: &Scope) -> Result<ReturnPlan> {
    let (shape, inner) = unwrap_async(sig, scope)?;

    let strategy = match inner {
        None => ReturnStrategy::Void,
        Some(ty) if is_unit_type(ty) => ReturnStrategy::Void,
        Some(ty) if is_string(ty) => ReturnStrategy::RawString,
        Some(ty) if is_named(ty, "ByteStream") => ReturnStrategy::RawStream,
        Some(ty) if is_byte_sequence(ty) => ReturnStrategy::RawByteArray(ty.clone()),
        Some(ty) if is_named(ty, "StatusCode") => ReturnStrategy::RawStatusCode,
        Some(ty) if is_named(ty, "Response") => ReturnStrategy::RawResponse,
        Some(ty) => {
            let via = serializers.deserializer().cloned().ok_or_else(|| {
                WeavingError::new(scope, ty.span(), "No serializer / deserializer found.")
            })?;
            ReturnStrategy::Deserialized {
                target: ty.clone(),
                via,
            }
        }
    };

    let continuation = match &strategy {
        ReturnStrategy::Deserialized { target, via } => Some(Continuation {
            name: format_ident!("__{}_cb", sig.ident.unraw()),
            target: target.clone(),
            via: via.clone(),
        }),
        _ => None,
    };

    Ok(ReturnPlan {
        shape,
        strategy,
        continuation,
    })
}

fn unwrap_async<'a>(sig: &'a Signature, scope: &Scope) -> Result<(ReturnShape, Option<&'a Type>)> {
    let declared = match &sig.output {
        ReturnType::Type(_, ty) => Some(ty.as_ref()),
        ReturnType::Default => None,
    };

    let unwrapped = match (sig.asyncness.is_some(), declared) {
        (true, Some(ty)) => unwrap_named(ty, "Result").map(|inner| (ReturnShape::Async, Some(inner))),
        (false, Some(ty)) if is_named(ty, "Task") => {
            Some((ReturnShape::Task, type_arguments(ty).into_iter().next()))
        }
        _ => None,
    };

    unwrapped.ok_or_else(|| {
        WeavingError::new(
            scope,
            sig.output.span(),
            "Expected an asynchronous return type (`async fn .. -> weft::Result<T>` or `fn .. -> weft::Task<'_, T>`).",
        )
    })
}
