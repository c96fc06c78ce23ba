//! Procedural macro for weft woven HTTP clients.
//!
//! This crate provides a single attribute, `#[weave]`, applied to an inline
//! module. Inside it, bodiless methods of inherent `impl` blocks carrying an
//! HTTP operation attribute are contract methods; the weaver replaces each one
//! with a body that builds a request, sends it through the type's transport
//! and adapts the response to the declared return type.
//!
//! Helper attributes understood inside the module (all stripped from the
//! output):
//! - `#[get]`, `#[post]`, `#[put]`, `#[delete]`, `#[patch]`, `#[head]`, `#[options]`, `#[trace]` - HTTP operations
//! - `#[http("VERB /path")]` - HTTP operation with an explicit verb
//! - `#[header("Name", "value")]` - static header on a contract method
//! - `#[body]`, `#[headers]`, `#[header("Name")]`, `#[query("key")]`, `#[alias("name")]` - parameter bindings
//! - `#[serializer]`, `#[deserializer]` - body serializer and response deserializer functions
//! - `#[transport]` - the accessor returning the transport of a type
//!
//! # Example
//!
//! ```ignore
//! #[weft::weave]
//! mod github {
//!     pub struct GitHub {
//!         transport: weft::ServiceTransport<Client>,
//!     }
//!
//!     impl GitHub {
//!         #[transport]
//!         fn transport(&self) -> &weft::ServiceTransport<Client> {
//!             &self.transport
//!         }
//!
//!         #[deserializer]
//!         fn from_json<T: serde::de::DeserializeOwned>(content: &str) -> weft::Result<T> {
//!             weft::json::from_str(content)
//!         }
//!
//!         #[get("users/{username}")]
//!         pub async fn user(&self, username: &str) -> weft::Result<User>;
//!     }
//! }
//! ```

mod attrs;
mod binding;
mod codegen;
mod descriptor;
mod error;
mod serializer;
mod strategy;
mod types;
mod weave;

use proc_macro::TokenStream;

/// Weave the contract methods of an inline module.
///
/// Every inherent `impl` block of the module is scanned. A bodiless method
/// with an HTTP operation attribute gets a generated body; a method with
/// such an attribute and a body is rejected. Methods without an operation
/// attribute are left untouched.
///
/// The first invalid declaration aborts the whole module with a single
/// compile error labeled `(Type.method)`.
///
/// # Attributes
///
/// - `crate` (optional): path of the runtime crate used by generated code
///   (default: `::weft`)
///
/// # Contract methods
///
/// A contract method takes `&self` and returns either
/// `weft::Task<'_, T>` or, as an `async fn`, `weft::Result<T>`. `T` decides how
/// the response is read:
///
/// | `T`                           | Result                                      |
/// |-------------------------------|---------------------------------------------|
/// | `()`                          | content discarded                           |
/// | `String`                      | content as text                             |
/// | `ByteStream`                  | content as a stream of chunks               |
/// | `Vec<u8>` / `Bytes`           | content as bytes                            |
/// | `StatusCode`                  | status code, any status accepted            |
/// | `Response`                    | the raw response, any status accepted       |
/// | anything else                 | deserialized with the `#[deserializer]`     |
///
/// Except for `StatusCode` and `Response`, a non-2xx status fails the call
/// with `weft::Error::Rest`.
///
/// # Example
///
/// ```ignore
/// #[weft::weave]
/// mod notes {
///     impl Notes {
///         #[transport]
///         fn client(&self) -> &Client {
///             &self.client
///         }
///
///         #[serializer]
///         fn to_json<T: serde::Serialize>(value: &T) -> weft::Result<String> {
///             weft::json::to_string(value)
///         }
///
///         #[post("notes")]
///         #[header("X-Api-Version", "2")]
///         fn create(&self, #[body] note: &Note) -> weft::Task<'_>;
///
///         #[get("notes/{id}")]
///         fn status(&self, #[alias("id")] note_id: u64) -> weft::Task<'_, weft::StatusCode>;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn weave(attr: TokenStream, item: TokenStream) -> TokenStream {
    weave::expand_weave(attr.into(), item.into())
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
