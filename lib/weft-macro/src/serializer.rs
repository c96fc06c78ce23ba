//! Serializer resolution.
//!
//! Functions marked `#[serializer]` or `#[deserializer]` are classified once
//! when the weave context is built. For each contract type the candidates form
//! two pools: the type-local pool (marked methods in the type's own `impl`
//! blocks) and the module-global pool (marked free functions and associated
//! functions of other types). A direction with any type-local candidate never
//! looks at the module-global pool; within a pool a string-form function wins
//! over a buffer-form one.

use std::fmt;

use proc_macro2::TokenStream;
use quote::quote;
use syn::spanned::Spanned;
use syn::{FnArg, Ident, ReturnType, Signature, Type};

use crate::attrs::{DESERIALIZER_ATTR, SERIALIZER_ATTR};
use crate::error::{Result, Scope, WeavingError};
use crate::types::{is_byte_sequence, is_byte_slice_ref, is_str_ref, is_string, unwrap_named};

/// Payload form of a serializer function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Form {
    /// `String` / `&str`.
    String,
    /// `Vec<u8>` or `Bytes` / `&[u8]`.
    Buffer,
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string-form"),
            Self::Buffer => f.write_str("buffer-form"),
        }
    }
}

/// Whether a marked function serializes bodies or deserializes responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Serialize,
    Deserialize,
}

impl Direction {
    const fn marker(self) -> &'static str {
        match self {
            Self::Serialize => SERIALIZER_ATTR,
            Self::Deserialize => DESERIALIZER_ATTR,
        }
    }
}

/// Where a serializer function lives, seen from a contract type.
#[derive(Debug, Clone)]
pub(crate) enum Owner {
    /// Declared in an `impl` block of the contract type itself.
    Local,
    /// A free function of the woven module.
    Free,
    /// An associated function of another type of the woven module.
    Associated(Box<Type>),
}

/// A resolved serializer or deserializer function.
#[derive(Debug, Clone)]
pub(crate) struct SerializerFn {
    pub(crate) ident: Ident,
    pub(crate) form: Form,
    /// No `&self` receiver.
    pub(crate) is_static: bool,
    pub(crate) owner: Owner,
}

impl SerializerFn {
    /// Path to call this function from a method of the contract type.
    pub(crate) fn callee(&self) -> TokenStream {
        let ident = &self.ident;
        match &self.owner {
            Owner::Local if self.is_static => quote!(Self::#ident),
            Owner::Local => quote!(self.#ident),
            Owner::Free => quote!(#ident),
            Owner::Associated(ty) => quote!(<#ty>::#ident),
        }
    }

    /// Same function, seen from another type of the module.
    fn with_owner(&self, owner: Owner) -> Self {
        Self {
            owner,
            ..self.clone()
        }
    }
}

/// A classified marked function, before pool assignment.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub(crate) direction: Direction,
    pub(crate) function: SerializerFn,
}

impl Candidate {
    /// Classify a function carrying a `#[serializer]` or `#[deserializer]` marker.
    ///
    /// Serializers take one value parameter and return `Result<String, _>`,
    /// `Result<Vec<u8>, _>` or `Result<Bytes, _>`. Deserializers take `&str` or
    /// `&[u8]` and declare one type parameter for the target type. Both may be
    /// methods taking `&self` or associated functions.
    pub(crate) fn classify(direction: Direction, sig: &Signature, scope: &Scope) -> Result<Self> {
        let marker = direction.marker();
        let is_static = match sig.receiver() {
            None => true,
            Some(receiver)
                if matches!(receiver.ty.as_ref(), Type::Reference(reference) if reference.mutability.is_none()) =>
            {
                false
            }
            Some(receiver) => {
                return Err(WeavingError::new(
                    scope,
                    receiver.span(),
                    format!("Expected #[{marker}] to take `&self` or no receiver."),
                ));
            }
        };

        let inputs: Vec<&Type> = sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(pat_type.ty.as_ref()),
                FnArg::Receiver(_) => None,
            })
            .collect();
        let [input] = inputs.as_slice() else {
            return Err(WeavingError::new(
                scope,
                sig.inputs.span(),
                format!(
                    "Expected #[{marker}] to take a single parameter, but got {} instead.",
                    inputs.len()
                ),
            ));
        };

        let form = match direction {
            Direction::Serialize => serialized_form(&sig.output).ok_or_else(|| {
                WeavingError::new(
                    scope,
                    sig.output.span(),
                    "Expected #[serializer] to return `Result<String, _>`, `Result<Vec<u8>, _>` or `Result<Bytes, _>`.",
                )
            })?,
            Direction::Deserialize => {
                let form = if is_str_ref(input) {
                    Form::String
                } else if is_byte_slice_ref(input) {
                    Form::Buffer
                } else {
                    return Err(WeavingError::new(
                        scope,
                        input.span(),
                        "Expected #[deserializer] to take `&str` or `&[u8]`.",
                    ));
                };
                if sig.generics.type_params().count() != 1 {
                    return Err(WeavingError::new(
                        scope,
                        sig.generics.span(),
                        "Expected #[deserializer] to declare a single type parameter for the target type.",
                    ));
                }
                form
            }
        };

        Ok(Self {
            direction,
            function: SerializerFn {
                ident: sig.ident.clone(),
                form,
                is_static,
                owner: Owner::Local,
            },
        })
    }

    /// The same candidate, registered in the module-global pool.
    pub(crate) fn globalize(&self, owner: Owner) -> Self {
        Self {
            direction: self.direction,
            function: self.function.with_owner(owner),
        }
    }
}

fn serialized_form(output: &ReturnType) -> Option<Form> {
    let ReturnType::Type(_, ty) = output else {
        return None;
    };
    let payload = unwrap_named(ty, "Result")?;
    if is_string(payload) {
        Some(Form::String)
    } else if is_byte_sequence(payload) {
        Some(Form::Buffer)
    } else {
        None
    }
}

/// The serializers available to one contract type.
#[derive(Debug, Clone, Default)]
pub(crate) struct SerializerPair {
    pub(crate) string_serialize: Option<SerializerFn>,
    pub(crate) buffer_serialize: Option<SerializerFn>,
    pub(crate) string_deserialize: Option<SerializerFn>,
    pub(crate) buffer_deserialize: Option<SerializerFn>,
}

impl SerializerPair {
    /// Resolve the four slots of a contract type from its two pools.
    ///
    /// For each direction, the type-local pool is used as soon as it holds
    /// any candidate of that direction; the module-global pool is consulted
    /// only otherwise. Two candidates of the same form in the consulted pool
    /// are ambiguous.
    pub(crate) fn resolve(local: &[Candidate], global: &[Candidate], scope: &Scope) -> Result<Self> {
        let side = |direction: Direction| -> Result<(Option<SerializerFn>, Option<SerializerFn>)> {
            let pool = if local.iter().any(|candidate| candidate.direction == direction) {
                local
            } else {
                global
            };
            Ok((
                single(pool, direction, Form::String, scope)?,
                single(pool, direction, Form::Buffer, scope)?,
            ))
        };

        let (string_serialize, buffer_serialize) = side(Direction::Serialize)?;
        let (string_deserialize, buffer_deserialize) = side(Direction::Deserialize)?;
        Ok(Self {
            string_serialize,
            buffer_serialize,
            string_deserialize,
            buffer_deserialize,
        })
    }

    /// Serializer for body parameters.
    pub(crate) fn serializer(&self) -> Option<&SerializerFn> {
        prefer(self.string_serialize.as_ref(), self.buffer_serialize.as_ref())
    }

    /// Deserializer for response content.
    pub(crate) fn deserializer(&self) -> Option<&SerializerFn> {
        prefer(
            self.string_deserialize.as_ref(),
            self.buffer_deserialize.as_ref(),
        )
    }
}

// Both slots come from the same pool, so string simply beats buffer.
fn prefer<'a>(
    string: Option<&'a SerializerFn>,
    buffer: Option<&'a SerializerFn>,
) -> Option<&'a SerializerFn> {
    string.or(buffer)
}

fn single(
    pool: &[Candidate],
    direction: Direction,
    form: Form,
    scope: &Scope,
) -> Result<Option<SerializerFn>> {
    let matching: Vec<&SerializerFn> = pool
        .iter()
        .filter(|candidate| candidate.direction == direction && candidate.function.form == form)
        .map(|candidate| &candidate.function)
        .collect();

    match matching.as_slice() {
        [] => Ok(None),
        [function] => Ok(Some((*function).clone())),
        [_, second, ..] => Err(WeavingError::new(
            scope,
            second.ident.span(),
            format!(
                "Expected a single {form} #[{}], but got {} instead.",
                direction.marker(),
                matching.len()
            ),
        )),
    }
}
