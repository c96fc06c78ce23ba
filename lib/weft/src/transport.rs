//! Tower-based transport.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tower::ServiceExt as _;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::trace;
use url::Url;

use crate::{Error, Request, Response, Result, Transport, TransportConfig};

/// Type-erased service behind a [`ServiceTransport`].
pub type BoxedService = BoxCloneService<Request, Response, Error>;

/// A [`Transport`] sending requests through a tower [`Service`].
///
/// Request URIs produced by woven methods are joined to the base URL. A
/// single leading `/` is ignored, so `"/users"` and `"users"` both resolve
/// below the base path. The configured default headers and `User-Agent` are added unless the
/// request already sets them. The service does the actual I/O, so any tower
/// stack (an HTTP client, a mock, [`LoggingLayer`](crate::middleware::LoggingLayer)
/// around either) can be plugged in.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use weft::{Request, Response, ServiceTransport, StatusCode};
///
/// let echo = tower::service_fn(|request: Request| async move {
///     Ok::<_, weft::Error>(Response::new(StatusCode::OK, HashMap::new(), request.uri().to_string().into()))
/// });
/// let transport = ServiceTransport::new(echo, "https://api.example.com/v1").expect("valid base URL");
/// assert_eq!(transport.base_url().as_str(), "https://api.example.com/v1/");
/// ```
#[derive(Clone)]
pub struct ServiceTransport {
    service: Arc<Mutex<BoxedService>>,
    base_url: Url,
    config: TransportConfig,
}

impl ServiceTransport {
    /// Create a transport with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new<S>(service: S, base_url: &str) -> Result<Self>
    where
        S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        Self::with_config(service, base_url, TransportConfig::default())
    }

    /// Create a transport with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn with_config<S>(service: S, base_url: &str, config: TransportConfig) -> Result<Self>
    where
        S: Service<Request, Response = Response, Error = Error> + Clone + Send + 'static,
        S::Future: Send + 'static,
    {
        let mut base_url = Url::parse(base_url)?;
        // Relative URIs replace the last segment unless the path ends with `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            service: Arc::new(Mutex::new(BoxCloneService::new(service))),
            base_url,
            config,
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn prepare(&self, request: Request) -> Result<Request> {
        let (method, uri, mut headers, body) = request.into_parts();
        let url = self.base_url.join(uri.strip_prefix('/').unwrap_or(&uri))?;
        trace!(%url, "resolved request URL");

        let missing = self.config.missing_headers(&headers);
        headers.extend(missing);

        Ok(Request::from_parts(method, url.as_str(), headers, body))
    }

    fn service(&self) -> BoxedService {
        // Lock, clone the service, and release the lock immediately
        self.service
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Transport for ServiceTransport {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        let request = self.prepare(request);
        let service = self.service();
        async move { service.oneshot(request?).await }
    }
}

impl fmt::Debug for ServiceTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceTransport")
            .field("base_url", &self.base_url.as_str())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert2::{check, let_assert};
    use http::{Method, StatusCode};

    use super::*;

    fn echo_uri(request: Request) -> std::future::Ready<Result<Response>> {
        let user_agent = request.header("user-agent").unwrap_or_default().to_string();
        let headers = HashMap::from([("x-user-agent".to_string(), user_agent)]);
        std::future::ready(Ok(Response::new(
            StatusCode::OK,
            headers,
            request.uri().to_string().into(),
        )))
    }

    #[test]
    fn base_url_gets_a_trailing_slash() {
        let transport = ServiceTransport::new(tower::service_fn(echo_uri), "http://localhost:8080/api")
            .expect("valid base URL");
        check!(transport.base_url().as_str() == "http://localhost:8080/api/");
    }

    #[test]
    fn invalid_base_url() {
        let result = ServiceTransport::new(tower::service_fn(echo_uri), "not a url");
        let_assert!(Err(Error::InvalidUrl(_)) = result);
    }

    #[tokio::test]
    async fn joins_relative_uris_and_adds_headers() {
        let config = TransportConfig::builder().user_agent("tests/1.0").build();
        let transport =
            ServiceTransport::with_config(tower::service_fn(echo_uri), "http://localhost/api", config)
                .expect("valid base URL");

        let request = Request::from_parts(Method::GET, "users/42?verbose=true", Vec::new(), None);
        let response = transport.send(request).await.expect("response");

        check!(response.header("x-user-agent") == Some("tests/1.0"));
        check!(response.into_body() == "http://localhost/api/users/42?verbose=true");
    }

    #[tokio::test]
    async fn leading_slash_stays_below_the_base_path() {
        let transport = ServiceTransport::new(tower::service_fn(echo_uri), "http://localhost/api")
            .expect("valid base URL");
        let request = Request::from_parts(Method::GET, "/users", Vec::new(), None);

        let response = transport.send(request).await.expect("response");
        check!(response.into_body() == "http://localhost/api/users");
    }

    #[tokio::test]
    async fn request_headers_win_over_defaults() {
        let transport = ServiceTransport::new(tower::service_fn(echo_uri), "http://localhost")
            .expect("valid base URL");
        let headers = vec![("User-Agent".to_string(), "custom".to_string())];
        let request = Request::from_parts(Method::GET, "ping", headers, None);

        let response = transport.send(request).await.expect("response");
        check!(response.header("x-user-agent") == Some("custom"));
    }
}
