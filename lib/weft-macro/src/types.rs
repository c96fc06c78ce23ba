//! Syntactic type inspection.
//!
//! The weaver only sees tokens, so types are recognized by the last segment of
//! their path (`weft::Result<T>`, `Result<T>` and `std::result::Result<T, E>`
//! are all "a `Result`").

use quote::quote;
use syn::{GenericArgument, PathArguments, PathSegment, Type};

/// Last path segment of a type, if it is a path type.
pub(crate) fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(type_path) if type_path.qself.is_none() => type_path.path.segments.last(),
        Type::Group(group) => last_segment(&group.elem),
        Type::Paren(paren) => last_segment(&paren.elem),
        _ => None,
    }
}

/// Returns `true` if the type's last path segment is `name`.
pub(crate) fn is_named(ty: &Type, name: &str) -> bool {
    last_segment(ty).is_some_and(|segment| segment.ident == name)
}

/// Generic type arguments of the last path segment, lifetimes skipped.
pub(crate) fn type_arguments(ty: &Type) -> Vec<&Type> {
    let Some(segment) = last_segment(ty) else {
        return Vec::new();
    };
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Vec::new();
    };
    args.args
        .iter()
        .filter_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// Unwrap `Name<T, ..>` to `T`.
pub(crate) fn unwrap_named<'a>(ty: &'a Type, name: &str) -> Option<&'a Type> {
    if !is_named(ty, name) {
        return None;
    }
    type_arguments(ty).into_iter().next()
}

/// Check if a type is the unit type `()`.
pub(crate) fn is_unit_type(ty: &Type) -> bool {
    matches!(ty, Type::Tuple(tuple) if tuple.elems.is_empty())
}

/// Strip any number of leading references.
pub(crate) fn strip_references(ty: &Type) -> &Type {
    match ty {
        Type::Reference(reference) => strip_references(&reference.elem),
        _ => ty,
    }
}

/// `&str`, with any lifetime.
pub(crate) fn is_str_ref(ty: &Type) -> bool {
    matches!(ty, Type::Reference(reference) if reference.mutability.is_none() && is_named(&reference.elem, "str"))
}

/// `&[u8]`, with any lifetime.
pub(crate) fn is_byte_slice_ref(ty: &Type) -> bool {
    let Type::Reference(reference) = ty else {
        return false;
    };
    reference.mutability.is_none()
        && matches!(reference.elem.as_ref(), Type::Slice(slice) if is_named(&slice.elem, "u8"))
}

/// `String` with no generic arguments.
pub(crate) fn is_string(ty: &Type) -> bool {
    last_segment(ty).is_some_and(|segment| {
        segment.ident == "String" && matches!(segment.arguments, PathArguments::None)
    })
}

/// `Vec<u8>`.
pub(crate) fn is_byte_vec(ty: &Type) -> bool {
    unwrap_named(ty, "Vec").is_some_and(|elem| is_named(elem, "u8"))
}

/// `Vec<u8>` or `Bytes`.
pub(crate) fn is_byte_sequence(ty: &Type) -> bool {
    is_byte_vec(ty) || is_named(ty, "Bytes")
}

/// Convert a `syn::Type` to a compact string for diagnostics.
pub(crate) fn type_to_string(ty: &Type) -> String {
    quote!(#ty)
        .to_string()
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("& ", "&")
        .replace(" :: ", "::")
        .replace(":: ", "::")
}
