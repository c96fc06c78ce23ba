//! Runtime types for weft woven HTTP clients.
//!
//! The `#[weft::weave]` macro turns bodiless contract methods into code that
//! drives the types of this crate:
//! - [`RequestProxy`] - accumulates verb, path, headers, query and body, then compiles a [`Request`]
//! - [`Transport`] - caller-supplied asynchronous `send(request)`
//! - [`Task`] - an in-flight call, with [`Task::continue_with`] for continuations
//! - [`adapter`] - raw content extraction from a response task (string, bytes, stream, status, response)
//! - [`Error`] and [`Result`] - error handling, including [`RestError`] for unsuccessful responses
//! - [`json`] - JSON helpers for user serializer functions
//! - [`Method`] and [`StatusCode`] - re-exported from the `http` crate

pub mod adapter;
mod body;
mod error;
pub mod json;
pub mod prelude;
mod proxy;
mod request;
mod response;
mod task;
mod transport;

pub use adapter::ByteStream;
pub use body::ContentType;
pub use error::{BoxError, Error, RestError, Result};
pub use proxy::RequestProxy;
pub use request::Request;
pub use response::Response;
pub use task::Task;
pub use transport::Transport;

// Re-export http crate types for verbs and status codes
pub use bytes::Bytes;
pub use http::{Method, StatusCode};
