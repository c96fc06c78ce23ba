//! Request/response logging middleware.
//!
//! Every request reaching the wrapped service runs inside a `weft_request`
//! `tracing` span carrying the method and the resolved URL.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tower::{Layer, Service};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{Error, Request, Response, Result};

/// Layer that adds request/response logging.
///
/// # Example
///
/// ```ignore
/// use weft::middleware::{LoggingLayer, ServiceBuilder};
///
/// let service = ServiceBuilder::new()
///     .layer(LoggingLayer::debug())
///     .service(client);
/// let transport = weft::ServiceTransport::new(service, "https://api.example.com")?;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLayer {
    level: LogLevel,
}

/// How much the logging middleware reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Also log request headers and body sizes, at debug level.
    Debug,
    /// Outcome only.
    #[default]
    Info,
}

impl LoggingLayer {
    /// Create a new logging layer with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging layer that also logs request details.
    #[must_use]
    pub fn debug() -> Self {
        Self {
            level: LogLevel::Debug,
        }
    }
}

impl<S> Layer<S> for LoggingLayer {
    type Service = Logging<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Logging {
            inner,
            level: self.level,
        }
    }
}

/// Service that logs requests and responses.
#[derive(Debug, Clone)]
pub struct Logging<S> {
    inner: S,
    level: LogLevel,
}

impl<S> Logging<S> {
    /// Log level of this service.
    pub const fn level(&self) -> LogLevel {
        self.level
    }
}

fn log_request(level: LogLevel, request: &Request) {
    match level {
        LogLevel::Debug => debug!(
            headers = request.headers().len(),
            content_type = request.header("Content-Type"),
            body_len = request.body().map_or(0, bytes::Bytes::len),
            "sending request"
        ),
        LogLevel::Info => info!("sending request"),
    }
}

fn log_outcome(result: &Result<Response>, elapsed: Duration) {
    let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    match result {
        Ok(response) if response.is_success() => info!(
            status = response.status().as_u16(),
            body_len = response.body().len(),
            elapsed_ms,
            "request completed"
        ),
        // Still handed back: the adapters decide whether the status is an error.
        Ok(response) => warn!(
            status = response.status().as_u16(),
            reason = response.reason(),
            elapsed_ms,
            "unsuccessful response"
        ),
        Err(err) => warn!(error = %err, elapsed_ms, "transport failed"),
    }
}

impl<S> Service<Request> for Logging<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let span = info_span!("weft_request", method = %request.method(), url = request.uri());
        let level = self.level;

        // The ready service is consumed; a fresh clone takes its place
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                log_request(level, &request);
                let start = Instant::now();
                let result = inner.call(request).await;
                log_outcome(&result, start.elapsed());
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use http::{Method, StatusCode};
    use tower::ServiceExt as _;

    use super::*;

    fn status_service(
        status: StatusCode,
    ) -> impl Service<Request, Response = Response, Error = Error, Future: Send> + Clone + Send + 'static
    {
        tower::service_fn(move |_request: Request| async move {
            Ok::<_, Error>(Response::new(status, HashMap::new(), bytes::Bytes::new()))
        })
    }

    #[test]
    fn logging_layer_default() {
        let service = LoggingLayer::new().layer(status_service(StatusCode::OK));
        check!(service.level() == LogLevel::Info);
    }

    #[test]
    fn logging_layer_debug() {
        let service = LoggingLayer::debug().layer(status_service(StatusCode::OK));
        check!(service.level() == LogLevel::Debug);
    }

    #[tokio::test]
    async fn unsuccessful_responses_are_passed_through() {
        let service = LoggingLayer::debug().layer(status_service(StatusCode::NOT_FOUND));
        let request = Request::from_parts(Method::GET, "missing", Vec::new(), None);

        let result = service.oneshot(request).await;
        let_assert!(Ok(response) = result);
        check!(response.status() == StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn transport_failures_are_passed_through() {
        let failing = tower::service_fn(|_request: Request| async {
            Err::<Response, _>(Error::transport("connection reset"))
        });
        let service = LoggingLayer::new().layer(failing);
        let request = Request::from_parts(Method::POST, "notes", Vec::new(), None);

        let result = service.oneshot(request).await;
        let_assert!(Err(Error::Transport(message)) = result);
        check!(message == "connection reset");
    }
}
