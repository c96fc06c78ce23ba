//! The weaving pass over one module.

use std::collections::HashMap;

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::spanned::Spanned;
use syn::{
    Attribute, FnArg, ForeignItemFn, Ident, ImplItem, Item, ItemImpl, ItemMod, LitStr, Path,
    ReturnType, Signature, Type, parse_quote,
};

use crate::attrs::{
    DESERIALIZER_ATTR, SERIALIZER_ATTR, TRANSPORT_ATTR, has_attr, strip_marker_attrs,
    strip_method_attrs, strip_param_attrs,
};
use crate::binding::resolve_bindings;
use crate::codegen::{WovenMethod, continuation_method};
use crate::descriptor::MethodDescriptor;
use crate::error::{Result, Scope, WeavingError};
use crate::serializer::{Candidate, Direction, Owner, SerializerPair};
use crate::strategy::select;
use crate::types::last_segment;

/// Parsed `#[weave(..)]` arguments.
#[derive(Debug)]
pub(crate) struct WeaveArgs {
    /// Path of the runtime crate in generated code.
    pub(crate) krate: Path,
}

impl Default for WeaveArgs {
    fn default() -> Self {
        Self {
            krate: parse_quote!(::weft),
        }
    }
}

fn parse_weave_args(attr: TokenStream) -> syn::Result<WeaveArgs> {
    let mut args = WeaveArgs::default();

    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("crate") {
            let value: LitStr = meta.value()?.parse()?;
            args.krate = value.parse()?;
            Ok(())
        } else {
            Err(meta.error("unsupported weave attribute"))
        }
    });

    syn::parse::Parser::parse2(parser, attr)?;
    Ok(args)
}

/// Expand `#[weave]` on an inline module.
pub(crate) fn expand_weave(attr: TokenStream, item: TokenStream) -> syn::Result<TokenStream> {
    let args = parse_weave_args(attr)?;
    let mut module: ItemMod = syn::parse2(item)?;

    let Some((_, items)) = &module.content else {
        return Err(syn::Error::new(
            module.ident.span(),
            "#[weave] expects an inline module: `mod name { .. }`",
        ));
    };
    let context = WeaveContext::build(args, &module.ident, items)?;

    let mut weaver = Weaver::new(&context);
    if let Some((_, items)) = &mut module.content {
        for item in items {
            weaver.weave_item(item)?;
        }
    }

    Ok(module.into_token_stream())
}

/// Everything the pass knows about the module, built once before any method
/// is rewritten.
#[derive(Debug)]
pub(crate) struct WeaveContext {
    krate: Path,
    /// Marked functions of each type's own `impl` blocks.
    local: HashMap<String, Vec<Candidate>>,
    /// Marked free functions and static functions of non-generic types.
    global: Vec<Candidate>,
    /// `#[transport]` accessors of each type.
    transports: HashMap<String, Vec<Ident>>,
}

impl WeaveContext {
    pub(crate) fn build(args: WeaveArgs, module: &Ident, items: &[Item]) -> Result<Self> {
        let mut context = Self {
            krate: args.krate,
            local: HashMap::new(),
            global: Vec::new(),
            transports: HashMap::new(),
        };

        let module_scope = Scope::Type(module.to_string());
        for item in items {
            match item {
                Item::Fn(item_fn) => {
                    let scope = module_scope.method(&item_fn.sig.ident);
                    for candidate in classify_markers(&item_fn.attrs, &item_fn.sig, &scope)? {
                        context.global.push(candidate.globalize(Owner::Free));
                    }
                }
                Item::Impl(item_impl) if item_impl.trait_.is_none() => {
                    context.register_impl(item_impl)?;
                }
                _ => {}
            }
        }

        Ok(context)
    }

    fn register_impl(&mut self, item_impl: &ItemImpl) -> Result<()> {
        let self_ty = item_impl.self_ty.as_ref();
        let key = type_key(self_ty);
        let type_scope = Scope::Type(type_label(self_ty));
        let shareable = item_impl.generics.params.is_empty();

        for impl_item in &item_impl.items {
            let ImplItem::Fn(method) = impl_item else {
                continue;
            };
            let scope = type_scope.method(&method.sig.ident);

            for candidate in classify_markers(&method.attrs, &method.sig, &scope)? {
                if shareable && candidate.function.is_static {
                    let owner = Owner::Associated(Box::new(self_ty.clone()));
                    self.global.push(candidate.globalize(owner));
                }
                self.local.entry(key.clone()).or_default().push(candidate);
            }

            if has_attr(&method.attrs, TRANSPORT_ATTR) {
                ensure_transport_shape(&method.sig, &scope)?;
                self.transports
                    .entry(key.clone())
                    .or_default()
                    .push(method.sig.ident.clone());
            }
        }

        Ok(())
    }

    fn transport(&self, key: &str, scope: &Scope, self_ty: &Type) -> Result<&Ident> {
        let accessors = self.transports.get(key).map(Vec::as_slice).unwrap_or_default();
        match accessors {
            [] => Err(WeavingError::new(
                scope,
                self_ty.span(),
                "No transport accessor marked with #[transport].",
            )),
            [accessor] => Ok(accessor),
            [_, second, ..] => Err(WeavingError::new(
                scope,
                second.span(),
                format!(
                    "Expected a single #[transport] accessor, but got {} instead.",
                    accessors.len()
                ),
            )),
        }
    }

    fn serializers(&self, key: &str, scope: &Scope) -> Result<SerializerPair> {
        let local = self.local.get(key).map(Vec::as_slice).unwrap_or_default();
        SerializerPair::resolve(local, &self.global, scope)
    }
}

fn classify_markers(attrs: &[Attribute], sig: &Signature, scope: &Scope) -> Result<Vec<Candidate>> {
    [
        (SERIALIZER_ATTR, Direction::Serialize),
        (DESERIALIZER_ATTR, Direction::Deserialize),
    ]
    .into_iter()
    .filter(|(marker, _)| has_attr(attrs, marker))
    .map(|(_, direction)| Candidate::classify(direction, sig, scope))
    .collect()
}

fn ensure_transport_shape(sig: &Signature, scope: &Scope) -> Result<()> {
    let shared_receiver = sig.receiver().is_some_and(
        |receiver| matches!(receiver.ty.as_ref(), Type::Reference(reference) if reference.mutability.is_none()),
    );
    let returns_reference = matches!(&sig.output, ReturnType::Type(_, ty) if matches!(ty.as_ref(), Type::Reference(_)));

    if shared_receiver && sig.inputs.len() == 1 && returns_reference && sig.asyncness.is_none() {
        Ok(())
    } else {
        Err(WeavingError::new(
            scope,
            sig.span(),
            "Expected #[transport] accessor to take `&self` and return a reference.",
        ))
    }
}

// Types are matched by their tokens: `Api`, `Api<T>` and `self::Api` are distinct.
fn type_key(ty: &Type) -> String {
    ty.to_token_stream().to_string()
}

fn type_label(ty: &Type) -> String {
    last_segment(ty).map_or_else(|| type_key(ty), |segment| segment.ident.to_string())
}

/// Rewrites the items of the module, one `impl` block at a time.
struct Weaver<'a> {
    context: &'a WeaveContext,
    serializers: HashMap<String, SerializerPair>,
}

impl<'a> Weaver<'a> {
    fn new(context: &'a WeaveContext) -> Self {
        Self {
            context,
            serializers: HashMap::new(),
        }
    }

    fn weave_item(&mut self, item: &mut Item) -> Result<()> {
        match item {
            Item::Fn(item_fn) => strip_marker_attrs(&mut item_fn.attrs),
            Item::Impl(item_impl) if item_impl.trait_.is_none() => self.weave_impl(item_impl)?,
            _ => {}
        }
        Ok(())
    }

    fn weave_impl(&mut self, item_impl: &mut ItemImpl) -> Result<()> {
        let self_ty = item_impl.self_ty.as_ref();
        let key = type_key(self_ty);
        let type_scope = Scope::Type(type_label(self_ty));
        let mut continuations = Vec::new();

        for impl_item in &mut item_impl.items {
            match impl_item {
                ImplItem::Fn(method) => {
                    let scope = type_scope.method(&method.sig.ident);
                    MethodDescriptor::extract(&method.attrs, &method.sig, true, &scope)?;
                    strip_marker_attrs(&mut method.attrs);
                }
                // Bodiless methods are not valid `impl` items, syn keeps them as tokens.
                ImplItem::Verbatim(tokens) => {
                    let Ok(placeholder) = syn::parse2::<ForeignItemFn>(tokens.clone()) else {
                        continue;
                    };
                    let scope = type_scope.method(&placeholder.sig.ident);
                    let Some(descriptor) =
                        MethodDescriptor::extract(&placeholder.attrs, &placeholder.sig, false, &scope)?
                    else {
                        continue;
                    };

                    let target = Target {
                        key: &key,
                        self_ty,
                        type_scope: &type_scope,
                        scope: &scope,
                    };
                    let (woven, continuation) = self.weave_method(placeholder, &descriptor, &target)?;
                    *impl_item = ImplItem::Verbatim(woven);
                    continuations.extend(continuation.map(ImplItem::Verbatim));
                }
                _ => {}
            }
        }

        item_impl.items.extend(continuations);
        Ok(())
    }

    fn weave_method(
        &mut self,
        placeholder: ForeignItemFn,
        descriptor: &MethodDescriptor,
        target: &Target<'_>,
    ) -> Result<(TokenStream, Option<TokenStream>)> {
        let context = self.context;
        let accessor = context.transport(target.key, target.type_scope, target.self_ty)?;
        let serializers = self.serializers(target.key, target.type_scope)?;

        let bindings = resolve_bindings(&placeholder.sig, &serializers, target.scope)?;
        let plan = select(&placeholder.sig, &serializers, target.scope)?;

        let body = WovenMethod {
            krate: &context.krate,
            accessor,
            descriptor,
            bindings: &bindings,
            plan: &plan,
        }
        .body();

        let ForeignItemFn {
            mut attrs,
            vis,
            mut sig,
            ..
        } = placeholder;
        strip_method_attrs(&mut attrs);
        for input in &mut sig.inputs {
            if let FnArg::Typed(pat_type) = input {
                strip_param_attrs(&mut pat_type.attrs);
            }
        }

        let woven = quote! {
            #(#attrs)*
            #vis #sig #body
        };
        let continuation = plan
            .continuation
            .as_ref()
            .map(|continuation| continuation_method(&context.krate, continuation));

        Ok((woven, continuation))
    }

    fn serializers(&mut self, key: &str, scope: &Scope) -> Result<SerializerPair> {
        if let Some(pair) = self.serializers.get(key) {
            return Ok(pair.clone());
        }
        let pair = self.context.serializers(key, scope)?;
        self.serializers.insert(key.to_string(), pair.clone());
        Ok(pair)
    }
}

/// The type a contract method is woven into.
struct Target<'a> {
    key: &'a str,
    self_ty: &'a Type,
    type_scope: &'a Scope,
    scope: &'a Scope,
}
