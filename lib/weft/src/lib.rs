//! Declarative REST clients woven from annotated placeholder methods.
//!
//! Declare the HTTP operations of a type as bodiless methods inside a
//! `#[weft::weave]` module; the weaver writes their bodies at compile time.
//! Requests go through the type's [`Transport`], reached with a `#[transport]`
//! accessor. [`ServiceTransport`] adapts any tower [`Service`](tower::Service).
//!
//! # Example
//!
//! ```ignore
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[weft::weave]
//! mod api {
//!     use super::User;
//!
//!     pub struct UserApi {
//!         pub transport: weft::ServiceTransport,
//!     }
//!
//!     impl UserApi {
//!         #[transport]
//!         fn transport(&self) -> &weft::ServiceTransport {
//!             &self.transport
//!         }
//!
//!         #[deserializer]
//!         fn from_json<T: serde::de::DeserializeOwned>(content: &str) -> weft::Result<T> {
//!             weft::json::from_str(content)
//!         }
//!
//!         #[get("users/{id}")]
//!         pub async fn get_user(&self, id: u64) -> weft::Result<User>;
//!     }
//! }
//!
//! let api = api::UserApi { transport: weft::ServiceTransport::new(http_service, "https://api.example.com")? };
//! let user = api.get_user(42).await?;
//! ```

mod config;
pub mod middleware;
pub mod prelude;
mod transport;

pub use config::{DEFAULT_USER_AGENT, TransportConfig, TransportConfigBuilder};
pub use transport::{BoxedService, ServiceTransport};

// Re-export tower for middleware composition
pub use tower;

// Re-export core types, also used by woven code
pub use weft_core::{
    BoxError, ByteStream, Bytes, ContentType, Error, Method, Request, RequestProxy, Response,
    RestError, Result, StatusCode, Task, Transport, adapter, json,
};

// Re-export the weaver
pub use weft_macro::weave;
