//! Code generation for woven methods.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Ident, Path};

use crate::binding::{BodyEncoding, BoundParameter, ParameterBinding};
use crate::descriptor::MethodDescriptor;
use crate::serializer::Form;
use crate::strategy::{Continuation, ReturnPlan, ReturnShape, ReturnStrategy};

/// Everything needed to weave one contract method.
pub(crate) struct WovenMethod<'a> {
    pub(crate) krate: &'a Path,
    pub(crate) accessor: &'a Ident,
    pub(crate) descriptor: &'a MethodDescriptor,
    pub(crate) bindings: &'a [BoundParameter],
    pub(crate) plan: &'a ReturnPlan,
}

// Generated locals never clash with the parameters of the contract method.
fn local(name: &str) -> Ident {
    Ident::new(name, Span::mixed_site())
}

impl WovenMethod<'_> {
    /// The body replacing the placeholder `;`.
    ///
    /// Static headers come first, then parameter bindings in declaration
    /// order. The compiled request is dispatched on the transport and the
    /// response task adapted to the declared return type.
    pub(crate) fn body(&self) -> TokenStream {
        let krate = self.krate;
        let accessor = self.accessor;
        let transport = local("__transport");
        let proxy = local("__proxy");
        let response = local("__response");

        let verb = self.descriptor.verb.accessor(krate);
        let path = &self.descriptor.path;

        let headers = self.descriptor.headers.iter().map(|(name, value)| {
            quote! { #proxy.add_header(#name, #value); }
        });
        let bindings = self
            .bindings
            .iter()
            .map(|bound| binding_code(&proxy, bound));

        let mutability = if self.descriptor.headers.is_empty() && self.bindings.is_empty() {
            quote!()
        } else {
            quote!(mut)
        };

        let result = self.adapt(&response);

        quote! {
            {
                let #transport = self.#accessor();
                let #mutability #proxy = #krate::RequestProxy::new(#verb, #path);
                #(#headers)*
                #(#bindings)*
                let #response = #krate::Transport::dispatch(#transport, #proxy.compile());
                #result
            }
        }
    }

    fn adapt(&self, response: &Ident) -> TokenStream {
        let krate = self.krate;
        let task = match &self.plan.strategy {
            ReturnStrategy::Void => quote!(#krate::adapter::call_void(#response)),
            ReturnStrategy::RawString => quote!(#krate::adapter::call_string(#response)),
            ReturnStrategy::RawStream => quote!(#krate::adapter::call_stream(#response)),
            ReturnStrategy::RawByteArray(ty) => {
                quote!(#krate::adapter::call_byte_array::<#ty>(#response))
            }
            ReturnStrategy::RawStatusCode => quote!(#krate::adapter::call_status_code(#response)),
            ReturnStrategy::RawResponse => quote!(#krate::adapter::call_response(#response)),
            ReturnStrategy::Deserialized { via, .. } => {
                let raw = match via.form {
                    Form::String => quote!(#krate::adapter::call_string(#response)),
                    Form::Buffer => quote!(#krate::adapter::call_bytes(#response)),
                };
                match &self.plan.continuation {
                    Some(continuation) => {
                        let name = &continuation.name;
                        let completed = local("__completed");
                        quote! {
                            #raw.continue_with(move |#completed| self.#name(#completed))
                        }
                    }
                    None => raw,
                }
            }
        };

        match self.plan.shape {
            ReturnShape::Async => quote!(#task.await),
            ReturnShape::Task => task,
        }
    }
}

fn binding_code(proxy: &Ident, bound: &BoundParameter) -> TokenStream {
    let ident = &bound.ident;
    match &bound.binding {
        ParameterBinding::PathArgument(name) => quote! { #proxy.add_path_arg(#name, &#ident); },
        ParameterBinding::QueryArgument(key) => quote! { #proxy.add_query(#key, &#ident); },
        ParameterBinding::Header(name) => quote! { #proxy.add_header(#name, &#ident); },
        ParameterBinding::HeaderMap => quote! { #proxy.add_headers(#ident.iter()); },
        ParameterBinding::Body(BodyEncoding::Direct) => quote! { #proxy.add_body_str(#ident); },
        ParameterBinding::Body(BodyEncoding::Serialized(serializer)) => {
            let callee = serializer.callee();
            match serializer.form {
                Form::String => quote! { #proxy.try_add_body_str(#callee(&#ident)); },
                Form::Buffer => quote! { #proxy.try_add_body_buf(#callee(&#ident)); },
            }
        }
    }
}

/// The hidden sibling method deserializing the raw response content.
pub(crate) fn continuation_method(krate: &Path, continuation: &Continuation) -> TokenStream {
    let Continuation { name, target, via } = continuation;
    let raw = raw_content(krate, continuation.intermediate());
    let callee = via.callee();
    let content = local("__content");

    quote! {
        #[doc(hidden)]
        #[allow(clippy::unused_self)]
        fn #name(&self, completed: #krate::Result<#raw>) -> #krate::Result<#target> {
            let #content = completed?;
            #callee::<#target>(&#content).map_err(#krate::Error::deserialization)
        }
    }
}

fn raw_content(krate: &Path, form: Form) -> TokenStream {
    match form {
        Form::String => quote!(::std::string::String),
        Form::Buffer => quote!(#krate::Bytes),
    }
}

#[cfg(test)]
mod tests {
    use syn::{ForeignItemFn, parse_quote};

    use super::*;
    use crate::binding::resolve_bindings;
    use crate::error::Scope;
    use crate::serializer::{Candidate, Direction, SerializerPair};
    use crate::strategy::select;

    fn compact(tokens: &TokenStream) -> String {
        tokens.to_string().replace(' ', "")
    }

    fn serializers() -> SerializerPair {
        let to_json: ForeignItemFn = parse_quote!(fn to_json<T>(&self, value: &T) -> weft::Result<String>;);
        let from_json: ForeignItemFn = parse_quote!(fn from_json<T>(content: &str) -> weft::Result<T>;);
        let scope = Scope::Type("Api".to_string());
        let candidates = [
            Candidate::classify(Direction::Serialize, &to_json.sig, &scope).expect("serializer"),
            Candidate::classify(Direction::Deserialize, &from_json.sig, &scope)
                .expect("deserializer"),
        ];
        SerializerPair::resolve(&candidates, &[], &scope).expect("resolve")
    }

    fn weave(item: &ForeignItemFn) -> (TokenStream, Option<TokenStream>) {
        let scope = Scope::Type("Api".to_string()).method(&item.sig.ident);
        let krate: Path = parse_quote!(::weft);
        let accessor: Ident = parse_quote!(client);
        let serializers = serializers();

        let descriptor = MethodDescriptor::extract(&item.attrs, &item.sig, false, &scope)
            .expect("extract")
            .expect("contract");
        let bindings = resolve_bindings(&item.sig, &serializers, &scope).expect("bindings");
        let plan = select(&item.sig, &serializers, &scope).expect("plan");

        let body = WovenMethod {
            krate: &krate,
            accessor: &accessor,
            descriptor: &descriptor,
            bindings: &bindings,
            plan: &plan,
        }
        .body();
        let continuation = plan
            .continuation
            .as_ref()
            .map(|continuation| continuation_method(&krate, continuation));
        (body, continuation)
    }

    #[test]
    fn get_with_path_argument() {
        let item: ForeignItemFn = parse_quote! {
            #[get("users/{id}")]
            fn get_user(&self, id: u32) -> weft::Task<'_, User>;
        };
        let (body, continuation) = weave(&item);
        assert_eq!(
            compact(&body),
            compact(&quote! {
                {
                    let __transport = self.client();
                    let mut __proxy = ::weft::RequestProxy::new(::weft::Method::GET, "users/{id}");
                    __proxy.add_path_arg("id", &id);
                    let __response = ::weft::Transport::dispatch(__transport, __proxy.compile());
                    ::weft::adapter::call_string(__response)
                        .continue_with(move |__completed| self.__get_user_cb(__completed))
                }
            })
        );
        assert_eq!(
            compact(&continuation.expect("continuation")),
            compact(&quote! {
                #[doc(hidden)]
                #[allow(clippy::unused_self)]
                fn __get_user_cb(&self, completed: ::weft::Result<::std::string::String>) -> ::weft::Result<User> {
                    let __content = completed?;
                    Self::from_json::<User>(&__content).map_err(::weft::Error::deserialization)
                }
            })
        );
    }

    #[test]
    fn post_with_serialized_body_and_headers() {
        let item: ForeignItemFn = parse_quote! {
            #[post("users")]
            #[header("X-Api", "1")]
            async fn create(&self, #[header("X-Trace")] trace: &str, #[body] user: &User) -> weft::Result<()>;
        };
        let (body, continuation) = weave(&item);
        assert!(continuation.is_none());
        assert_eq!(
            compact(&body),
            compact(&quote! {
                {
                    let __transport = self.client();
                    let mut __proxy = ::weft::RequestProxy::new(::weft::Method::POST, "users");
                    __proxy.add_header("X-Api", "1");
                    __proxy.add_header("X-Trace", &trace);
                    __proxy.try_add_body_str(self.to_json(&user));
                    let __response = ::weft::Transport::dispatch(__transport, __proxy.compile());
                    ::weft::adapter::call_void(__response).await
                }
            })
        );
    }

    #[test]
    fn proxy_is_immutable_without_inputs() {
        let item: ForeignItemFn = parse_quote! {
            #[delete("session")]
            fn logout(&self) -> weft::Task<'_, weft::StatusCode>;
        };
        let (body, _) = weave(&item);
        let body = compact(&body);
        assert!(body.contains("let__proxy=::weft::RequestProxy::new(::weft::Method::DELETE,\"session\");"));
        assert!(body.ends_with("::weft::adapter::call_status_code(__response)}"));
    }

    #[test]
    fn raw_adapters() {
        let item: ForeignItemFn = parse_quote! {
            #[get("files/{name}")]
            async fn download(&self, name: &str, #[query("v")] version: u32, #[headers] extra: &HashMap<String, String>) -> weft::Result<Vec<u8>>;
        };
        let (body, continuation) = weave(&item);
        assert!(continuation.is_none());
        let body = compact(&body);
        assert!(body.contains("__proxy.add_query(\"v\",&version);"));
        assert!(body.contains("__proxy.add_headers(extra.iter());"));
        assert!(body.contains("::weft::adapter::call_byte_array::<Vec<u8>>(__response).await"));
    }
}
