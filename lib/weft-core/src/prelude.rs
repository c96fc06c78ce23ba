//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types for glob importing:
//!
//! ```ignore
//! use weft_core::prelude::*;
//! ```

pub use crate::{
    ByteStream, Bytes, Error, Method, Request, RequestProxy, Response, RestError, Result,
    StatusCode, Task, Transport,
};
