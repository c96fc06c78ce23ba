//! Transport trait.
//!
//! The transport is the caller-supplied half of a woven client: generated code
//! compiles a [`Request`] and hands it to [`Transport::dispatch`]. weft itself
//! never opens a socket.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::{Request, Response, Result, Task};

/// Asynchronous request sender used by woven methods.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use weft_core::{Request, Response, Result, StatusCode, Transport};
///
/// struct Echo;
///
/// impl Transport for Echo {
///     fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
///         let body = request.body().cloned().unwrap_or_default();
///         async move { Ok(Response::new(StatusCode::OK, HashMap::new(), body)) }
///     }
/// }
/// ```
pub trait Transport: Send + Sync {
    /// Send a request and return the response.
    ///
    /// Any status code is a successful send: the success gate is applied by
    /// the [`adapter`](crate::adapter) functions.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be delivered.
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;

    /// Send a compiled request, or short-circuit on a compile failure.
    fn dispatch(&self, request: Result<Request>) -> Task<'_, Response> {
        match request {
            Ok(request) => {
                debug!(method = %request.method(), uri = request.uri(), "dispatching request");
                Task::new(self.send(request))
            }
            Err(err) => {
                debug!(error = %err, "request compilation failed");
                Task::ready(Err(err))
            }
        }
    }
}

impl<T: Transport> Transport for &T {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).send(request)
    }
}

impl<T: Transport> Transport for Arc<T> {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).send(request)
    }
}
