//! Request proxy driven by woven method bodies.
//!
//! The proxy accumulates verb, path template, headers, query pairs, path
//! arguments and body, then compiles them into a [`Request`]. Mutations never
//! fail on their own: a failed serializer is remembered and reported by
//! [`RequestProxy::compile`], so generated code can chain calls without `?`.

use bytes::Bytes;
use http::Method;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::trace;

use crate::{BoxError, ContentType, Error, Request, Result};

// Unreserved: A-Z a-z 0-9 - . _ ~
const PATH_SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'\\')
    .add(b'%');

/// Builder for one HTTP call, created by woven code.
///
/// # Example
///
/// ```
/// use weft_core::{Method, RequestProxy};
///
/// let mut proxy = RequestProxy::new(Method::GET, "users/{id}/posts");
/// proxy.add_header("Accept", "application/json");
/// proxy.add_path_arg("id", &42);
/// proxy.add_query("page", &2);
///
/// let request = proxy.compile().expect("valid request");
/// assert_eq!(request.uri(), "users/42/posts?page=2");
/// assert_eq!(request.header("accept"), Some("application/json"));
/// ```
#[derive(Debug)]
pub struct RequestProxy {
    method: Method,
    template: &'static str,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
    path_args: Vec<(String, String)>,
    body: Option<(Bytes, ContentType)>,
    error: Option<Error>,
}

impl RequestProxy {
    /// Start a request for the given verb and path template.
    #[must_use]
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            headers: Vec::new(),
            query: Vec::new(),
            path_args: Vec::new(),
            body: None,
            error: None,
        }
    }

    /// The verb this proxy was created with.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// The path template this proxy was created with.
    #[must_use]
    pub const fn template(&self) -> &'static str {
        self.template
    }

    /// Append a header. Repeated names are kept in insertion order.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl ToString) {
        self.headers.push((name.into(), value.to_string()));
    }

    /// Append every entry of a header map.
    pub fn add_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: ToString,
        V: ToString,
    {
        self.headers.extend(
            headers
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
    }

    /// Append a query pair.
    pub fn add_query(&mut self, key: impl Into<String>, value: impl ToString) {
        self.query.push((key.into(), value.to_string()));
    }

    /// Bind a `{name}` placeholder of the path template.
    ///
    /// The value is percent-encoded as a path segment at compile time.
    pub fn add_path_arg(&mut self, name: impl Into<String>, value: impl ToString) {
        self.path_args.push((name.into(), value.to_string()));
    }

    /// Set a text body (`text/plain; charset=utf-8`).
    pub fn add_body_str(&mut self, body: impl Into<String>) {
        self.body = Some((Bytes::from(body.into()), ContentType::PlainText));
    }

    /// Set a binary body (`application/octet-stream`).
    pub fn add_body_buf(&mut self, body: impl Into<Bytes>) {
        self.body = Some((body.into(), ContentType::OctetStream));
    }

    /// Set a text body produced by a serializer.
    ///
    /// A serializer failure is reported by [`compile`](Self::compile).
    pub fn try_add_body_str<S, E>(&mut self, body: std::result::Result<S, E>)
    where
        S: Into<String>,
        E: Into<BoxError>,
    {
        match body {
            Ok(body) => self.add_body_str(body),
            Err(err) => self.defer(Error::serialization(err)),
        }
    }

    /// Set a binary body produced by a serializer.
    ///
    /// A serializer failure is reported by [`compile`](Self::compile).
    pub fn try_add_body_buf<B, E>(&mut self, body: std::result::Result<B, E>)
    where
        B: Into<Bytes>,
        E: Into<BoxError>,
    {
        match body {
            Ok(body) => self.add_body_buf(body),
            Err(err) => self.defer(Error::serialization(err)),
        }
    }

    fn defer(&mut self, err: Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    /// Compile into a [`Request`].
    ///
    /// Path arguments are substituted in the order they were added. A
    /// `Content-Type` header is added for the body unless one was set
    /// explicitly.
    ///
    /// # Errors
    ///
    /// Returns the first deferred serializer error, or
    /// [`Error::InvalidRequest`] if a `{placeholder}` of the template has no
    /// matching path argument.
    pub fn compile(self) -> Result<Request> {
        let Self {
            method,
            template,
            mut headers,
            query,
            path_args,
            body,
            error,
        } = self;

        if let Some(err) = error {
            return Err(err);
        }

        let mut uri = template.to_string();
        for (name, value) in &path_args {
            let placeholder = format!("{{{name}}}");
            if !uri.contains(&placeholder) {
                trace!(name = %name, template, "path argument not used by template");
                continue;
            }
            let encoded = utf8_percent_encode(value, PATH_SEGMENT_ENCODE_SET).to_string();
            uri = uri.replace(&placeholder, &encoded);
        }

        if let Some(name) = unresolved_placeholder(&uri) {
            return Err(Error::invalid_request(format!(
                "unresolved path argument `{{{name}}}` in `{template}`"
            )));
        }

        if !query.is_empty() {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&query)
                .finish();
            uri.push(if uri.contains('?') { '&' } else { '?' });
            uri.push_str(&encoded);
        }

        let body = body.map(|(bytes, content_type)| {
            let has_content_type = headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case("Content-Type"));
            if !has_content_type {
                headers.push(("Content-Type".to_string(), content_type.to_string()));
            }
            bytes
        });

        Ok(Request::from_parts(method, uri, headers, body))
    }
}

fn unresolved_placeholder(uri: &str) -> Option<&str> {
    let start = uri.find('{')?;
    let rest = uri.get(start + 1..)?;
    let end = rest.find('}')?;
    rest.get(..end)
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    #[test]
    fn compiles_path_arguments_in_order() {
        let mut proxy = RequestProxy::new(Method::GET, "users/{id}/repos/{repo}");
        proxy.add_path_arg("id", &"john doe");
        proxy.add_path_arg("repo", &"a/b");

        let request = proxy.compile().expect("valid request");
        check!(request.method() == &Method::GET);
        check!(request.uri() == "users/john%20doe/repos/a%2Fb");
        check!(request.body().is_none());
    }

    #[test]
    fn unresolved_placeholder_is_an_error() {
        let mut proxy = RequestProxy::new(Method::GET, "users/{id}");
        proxy.add_path_arg("name", &"ignored");

        let_assert!(Err(Error::InvalidRequest(message)) = proxy.compile());
        check!(message == "unresolved path argument `{id}` in `users/{id}`");
    }

    #[test]
    fn query_pairs_are_form_encoded() {
        let mut proxy = RequestProxy::new(Method::GET, "search?lang=en");
        proxy.add_query("q", &"rust & co");
        proxy.add_query("page", &3);

        let request = proxy.compile().expect("valid request");
        check!(request.uri() == "search?lang=en&q=rust+%26+co&page=3");
    }

    #[test]
    fn headers_keep_insertion_order() {
        let mut proxy = RequestProxy::new(Method::POST, "items");
        proxy.add_header("X", "1");
        proxy.add_headers([("A", "2"), ("B", "3")]);
        proxy.add_header("X", "4");

        let request = proxy.compile().expect("valid request");
        let names: Vec<_> = request.headers().iter().map(|(k, v)| format!("{k}={v}")).collect();
        check!(names == ["X=1", "A=2", "B=3", "X=4"]);
    }

    #[test]
    fn string_body_sets_plain_text_content_type() {
        let mut proxy = RequestProxy::new(Method::POST, "notes");
        proxy.add_body_str("hello");

        let request = proxy.compile().expect("valid request");
        check!(request.header("content-type") == Some("text/plain; charset=utf-8"));
        check!(request.body() == Some(&Bytes::from("hello")));
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let mut proxy = RequestProxy::new(Method::PUT, "blobs");
        proxy.add_header("Content-Type", "image/png");
        proxy.add_body_buf(vec![1_u8, 2, 3]);

        let request = proxy.compile().expect("valid request");
        check!(request.headers().len() == 1);
        check!(request.header("Content-Type") == Some("image/png"));
    }

    #[test]
    fn serializer_failure_is_deferred_to_compile() {
        let mut proxy = RequestProxy::new(Method::POST, "users");
        proxy.try_add_body_str(Err::<String, _>("cannot serialize"));
        proxy.try_add_body_buf(Err::<Vec<u8>, _>("second failure"));

        let_assert!(Err(err) = proxy.compile());
        check!(err.to_string() == "serialization error: cannot serialize");
    }
}
