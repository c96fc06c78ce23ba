//! Parameter binding resolution.

use syn::ext::IdentExt as _;
use syn::spanned::Spanned;
use syn::{Attribute, FnArg, Ident, Pat, PatType, Signature, Type};

use crate::attrs::{ALIAS_ATTR, AttrArgs, BODY_ATTR, HEADER_ATTR, HEADERS_ATTR, QUERY_ATTR, find_attrs, has_attr};
use crate::error::{Result, Scope, WeavingError};
use crate::serializer::{SerializerFn, SerializerPair};
use crate::types::{is_named, is_str_ref, is_string, strip_references, type_arguments, type_to_string, unwrap_named};

/// How a body parameter reaches the request.
#[derive(Debug, Clone)]
pub(crate) enum BodyEncoding {
    /// `String`, `&str` or `&String`, appended as is.
    Direct,
    /// Any other type, through the resolved serializer.
    Serialized(SerializerFn),
}

/// How one parameter reaches the request.
#[derive(Debug, Clone)]
pub(crate) enum ParameterBinding {
    PathArgument(String),
    QueryArgument(String),
    Header(String),
    HeaderMap,
    Body(BodyEncoding),
}

/// A parameter and its binding.
#[derive(Debug, Clone)]
pub(crate) struct BoundParameter {
    pub(crate) ident: Ident,
    pub(crate) binding: ParameterBinding,
}

/// Bind every non-receiver parameter, in declaration order.
///
/// The first matching attribute wins: `#[body]`, `#[headers]`, `#[header]`,
/// `#[query]`, then `#[alias]` or the parameter's own name as a path argument.
pub(crate) fn resolve_bindings(
    sig: &Signature,
    serializers: &SerializerPair,
    scope: &Scope,
) -> Result<Vec<BoundParameter>> {
    sig.inputs
        .iter()
        .filter_map(|arg| match arg {
            FnArg::Typed(pat_type) => Some(pat_type),
            FnArg::Receiver(_) => None,
        })
        .map(|pat_type| bind_parameter(pat_type, serializers, scope))
        .collect()
}

fn bind_parameter(
    pat_type: &PatType,
    serializers: &SerializerPair,
    scope: &Scope,
) -> Result<BoundParameter> {
    let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
        return Err(WeavingError::new(
            scope,
            pat_type.pat.span(),
            "Expected a named parameter.",
        ));
    };
    if pat_ident.by_ref.is_some() || pat_ident.subpat.is_some() {
        return Err(WeavingError::new(
            scope,
            pat_ident.span(),
            "Expected a named parameter.",
        ));
    }

    let ident = pat_ident.ident.clone();
    let attrs = &pat_type.attrs;
    let ty = pat_type.ty.as_ref();

    let binding = if has_attr(attrs, BODY_ATTR) {
        ParameterBinding::Body(body_encoding(ty, serializers, scope)?)
    } else if has_attr(attrs, HEADERS_ATTR) {
        ensure_string_keyed_map(ty, scope)?;
        ParameterBinding::HeaderMap
    } else if let Some(attr) = first_attr(attrs, HEADER_ATTR) {
        ParameterBinding::Header(single_argument(attr, "header", scope)?)
    } else if let Some(attr) = first_attr(attrs, QUERY_ATTR) {
        ParameterBinding::QueryArgument(single_argument(attr, "query", scope)?)
    } else if let Some(attr) = first_attr(attrs, ALIAS_ATTR) {
        ParameterBinding::PathArgument(single_argument(attr, "alias", scope)?)
    } else {
        ParameterBinding::PathArgument(ident.unraw().to_string())
    };

    Ok(BoundParameter { ident, binding })
}

fn first_attr<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    find_attrs(attrs, name).into_iter().next()
}

fn body_encoding(ty: &Type, serializers: &SerializerPair, scope: &Scope) -> Result<BodyEncoding> {
    if is_string_sink(ty) {
        return Ok(BodyEncoding::Direct);
    }
    serializers
        .serializer()
        .cloned()
        .map(BodyEncoding::Serialized)
        .ok_or_else(|| {
            WeavingError::new(
                scope,
                ty.span(),
                "No serialization method specified by #[serializer].",
            )
        })
}

/// `String`, `&str` or `&String`.
fn is_string_sink(ty: &Type) -> bool {
    match ty {
        Type::Reference(reference) => {
            is_str_ref(ty) || (reference.mutability.is_none() && is_string(&reference.elem))
        }
        _ => is_string(ty),
    }
}

const MAP_TYPES: &[&str] = &["HashMap", "BTreeMap", "IndexMap"];

fn ensure_string_keyed_map(ty: &Type, scope: &Scope) -> Result<()> {
    let map = strip_references(ty);
    let args = type_arguments(map);
    let string_keyed = MAP_TYPES.iter().any(|name| is_named(map, name))
        && args.len() >= 2
        && args.first().is_some_and(|key| is_string_key(key));

    if string_keyed {
        Ok(())
    } else {
        Err(WeavingError::new(
            scope,
            ty.span(),
            format!(
                "Expected a string-keyed map (`HashMap<String, _>`) but got `{}`",
                type_to_string(ty)
            ),
        ))
    }
}

/// `String`, `&str` or `Cow<str>`.
fn is_string_key(ty: &Type) -> bool {
    is_string(ty) || is_str_ref(ty) || unwrap_named(ty, "Cow").is_some_and(|inner| is_named(inner, "str"))
}

fn single_argument(attr: &Attribute, name: &str, scope: &Scope) -> Result<String> {
    let args = AttrArgs::parse(attr, scope)?;
    if args.len() > 1 || (name == HEADER_ATTR && args.len() != 1) {
        return Err(WeavingError::new(
            scope,
            attr.span(),
            format!(
                "#[{name}] expected a single parameter, but got {} instead.",
                args.len()
            ),
        ));
    }
    args.string(0).ok_or_else(|| {
        WeavingError::new(
            scope,
            attr.span(),
            format!("Parameters for #[{name}] mustn't be null."),
        )
    })
}

#[cfg(test)]
mod tests {
    use syn::{ForeignItemFn, parse_quote};

    use super::*;
    use crate::serializer::{Candidate, Direction};

    fn scope() -> Scope {
        Scope::Type("Api".to_string()).method("call")
    }

    fn json_serializers() -> SerializerPair {
        let item: ForeignItemFn = parse_quote! {
            fn to_json<T>(&self, value: &T) -> weft::Result<String>;
        };
        let candidate =
            Candidate::classify(Direction::Serialize, &item.sig, &scope()).expect("serializer");
        SerializerPair::resolve(&[candidate], &[], &scope()).expect("resolve")
    }

    fn bind(item: &ForeignItemFn, serializers: &SerializerPair) -> Result<Vec<BoundParameter>> {
        resolve_bindings(&item.sig, serializers, &scope())
    }

    fn describe(bound: &[BoundParameter]) -> Vec<String> {
        bound
            .iter()
            .map(|param| match &param.binding {
                ParameterBinding::PathArgument(name) => format!("{}: path({name})", param.ident),
                ParameterBinding::QueryArgument(key) => format!("{}: query({key})", param.ident),
                ParameterBinding::Header(key) => format!("{}: header({key})", param.ident),
                ParameterBinding::HeaderMap => format!("{}: headers", param.ident),
                ParameterBinding::Body(BodyEncoding::Direct) => format!("{}: body", param.ident),
                ParameterBinding::Body(BodyEncoding::Serialized(function)) => {
                    format!("{}: body via {}", param.ident, function.ident)
                }
            })
            .collect()
    }

    #[test]
    fn bindings_in_declaration_order() {
        let item: ForeignItemFn = parse_quote! {
            #[post("users/{user_id}")]
            fn call(
                &self,
                #[alias("user_id")] id: u32,
                #[query("verbose")] verbose: bool,
                #[header("X-Trace")] trace: &str,
                #[headers] extra: &HashMap<String, String>,
                #[body] user: &User,
                r#type: &str,
            ) -> weft::Task<'_, ()>;
        };
        let bound = bind(&item, &json_serializers()).expect("bind");
        assert_eq!(
            describe(&bound),
            vec![
                "id: path(user_id)",
                "verbose: query(verbose)",
                "trace: header(X-Trace)",
                "extra: headers",
                "user: body via to_json",
                "r#type: path(type)",
            ]
        );
    }

    #[test]
    fn header_beats_alias() {
        let item: ForeignItemFn = parse_quote! {
            #[get("users/{id}")]
            fn call(&self, #[alias("id")] #[header("X-Id")] id: u32) -> weft::Task<'_, ()>;
        };
        let bound = bind(&item, &SerializerPair::default()).expect("bind");
        assert_eq!(describe(&bound), vec!["id: header(X-Id)"]);
    }

    #[test]
    fn body_beats_everything() {
        let item: ForeignItemFn = parse_quote! {
            #[post("notes")]
            fn call(&self, #[query("q")] #[body] note: String) -> weft::Task<'_, ()>;
        };
        let bound = bind(&item, &SerializerPair::default()).expect("bind");
        assert_eq!(describe(&bound), vec!["note: body"]);
    }

    #[test]
    fn string_bodies_skip_the_serializer() {
        let item: ForeignItemFn = parse_quote! {
            #[post("notes")]
            fn call(&self, #[body] a: &str, #[body] b: &String, #[body] c: &'static str) -> weft::Task<'_, ()>;
        };
        let bound = bind(&item, &json_serializers()).expect("bind");
        assert_eq!(describe(&bound), vec!["a: body", "b: body", "c: body"]);
    }

    #[test]
    fn body_without_serializer() {
        let item: ForeignItemFn = parse_quote! {
            #[post("users")]
            fn call(&self, #[body] user: &User) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("no serializer");
        insta::assert_snapshot!(err, @"(Api.call) No serialization method specified by #[serializer].");
    }

    #[test]
    fn header_map_must_be_string_keyed() {
        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(
                &self,
                #[headers] a: BTreeMap<&str, u32>,
                #[headers] b: &IndexMap<Cow<'static, str>, String>,
            ) -> weft::Task<'_, ()>;
        };
        assert!(bind(&item, &SerializerPair::default()).is_ok());

        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(&self, #[headers] extra: HashMap<u32, String>) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("not string keyed");
        insta::assert_snapshot!(err, @"(Api.call) Expected a string-keyed map (`HashMap<String, _>`) but got `HashMap<u32, String>`");

        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(&self, #[headers] extra: Vec<(String, String)>) -> weft::Task<'_, ()>;
        };
        assert!(bind(&item, &SerializerPair::default()).is_err());
    }

    #[test]
    fn header_parameter_validation() {
        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(&self, #[header] token: &str) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("arity");
        insta::assert_snapshot!(err, @"(Api.call) #[header] expected a single parameter, but got 0 instead.");

        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(&self, #[header(None)] token: &str) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("null");
        insta::assert_snapshot!(err, @"(Api.call) Parameters for #[header] mustn't be null.");
    }

    #[test]
    fn query_and_alias_must_not_be_null() {
        let item: ForeignItemFn = parse_quote! {
            #[get("users")]
            fn call(&self, #[query(None)] page: u32) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("null");
        insta::assert_snapshot!(err, @"(Api.call) Parameters for #[query] mustn't be null.");

        let item: ForeignItemFn = parse_quote! {
            #[get("users/{id}")]
            fn call(&self, #[alias] id: u32) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("null");
        insta::assert_snapshot!(err, @"(Api.call) Parameters for #[alias] mustn't be null.");
    }

    #[test]
    fn parameters_must_be_named() {
        let item: ForeignItemFn = parse_quote! {
            #[get("points")]
            fn call(&self, (x, y): (u32, u32)) -> weft::Task<'_, ()>;
        };
        let err = bind(&item, &SerializerPair::default()).expect_err("pattern");
        insta::assert_snapshot!(err, @"(Api.call) Expected a named parameter.");
    }
}
