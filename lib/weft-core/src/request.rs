//! Compiled HTTP requests.
//!
//! A [`Request`] is produced by [`RequestProxy::compile`](crate::RequestProxy::compile)
//! and handed to a [`Transport`](crate::Transport). Its URI is relative to the
//! transport's base address (e.g. `users/42?verbose=true`).

use bytes::Bytes;
use http::Method;

/// An HTTP request with method, URI, ordered headers and optional body.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl Request {
    /// Assemble a request from its parts.
    #[must_use]
    pub fn from_parts(
        method: Method,
        uri: impl Into<String>,
        headers: Vec<(String, String)>,
        body: Option<Bytes>,
    ) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers,
            body,
        }
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI (path and query).
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Request headers, in insertion order.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value with the given name (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `true` if a header with the given name is present (case-insensitive).
    #[must_use]
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// Request body.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Consume into (method, uri, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (Method, String, Vec<(String, String)>, Option<Bytes>) {
        (self.method, self.uri, self.headers, self.body)
    }
}
