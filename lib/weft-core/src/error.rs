//! Error types for weft.

use derive_more::{Display, Error, From};

use crate::Response;

/// Boxed error produced by user serializer and deserializer functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Rest Error
// ============================================================================

/// An unsuccessful HTTP response (status outside `200..=299`).
///
/// Raised by the response adapters unless the caller asked for the raw
/// [`StatusCode`](crate::StatusCode) or the raw [`Response`], in which case
/// failures are handled by the caller.
#[derive(Debug, Display, Error)]
#[display("{} - {}", response.status().as_u16(), response.reason())]
pub struct RestError {
    #[error(not(source))]
    response: Response,
}

impl RestError {
    /// Wrap an unsuccessful response.
    #[must_use]
    pub fn new(response: Response) -> Self {
        Self { response }
    }

    /// The response whose status was not a success.
    #[must_use]
    pub const fn response(&self) -> &Response {
        &self.response
    }

    /// Shorthand for the response status code.
    #[must_use]
    pub const fn status(&self) -> crate::StatusCode {
        self.response.status()
    }

    /// Consume into the response.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }
}

// ============================================================================
// Error Type
// ============================================================================

/// Main error type for weft calls.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a non-2xx status.
    #[display("Rest error: {_0}")]
    #[from]
    Rest(#[error(not(source))] RestError),

    /// The transport failed to deliver the request.
    #[display("transport error: {_0}")]
    #[from(skip)]
    Transport(#[error(not(source))] String),

    /// Invalid request configuration (e.g. unresolved path argument).
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// A `#[serializer]` function failed.
    #[display("serialization error: {_0}")]
    #[from(skip)]
    Serialization(#[error(not(source))] BoxError),

    /// A `#[deserializer]` function failed.
    #[display("deserialization error: {_0}")]
    #[from(skip)]
    Deserialization(#[error(not(source))] BoxError),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// The response body is not valid UTF-8.
    #[display("invalid UTF-8 body: {_0}")]
    #[from]
    InvalidUtf8(std::string::FromUtf8Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Wrap a serializer failure.
    ///
    /// A weft [`Error`] returned by the serializer is kept as is.
    pub fn serialization(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<Self>() {
            Ok(err) => *err,
            Err(other) => Self::Serialization(other),
        }
    }

    /// Wrap a deserializer failure.
    ///
    /// A weft [`Error`] returned by the deserializer is kept as is.
    pub fn deserialization(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<Self>() {
            Ok(err) => *err,
            Err(other) => Self::Deserialization(other),
        }
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns the [`RestError`] if the server answered with a non-2xx status.
    #[must_use]
    pub const fn as_rest(&self) -> Option<&RestError> {
        match self {
            Self::Rest(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this is a [`RestError`].
    #[must_use]
    pub fn status(&self) -> Option<crate::StatusCode> {
        self.as_rest().map(RestError::status)
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(crate::StatusCode::NOT_FOUND)
    }
}
