//! JSON helpers for user serializer functions.
//!
//! The weaver never picks a format on its own: a `#[serializer]` or
//! `#[deserializer]` function decides. These helpers make the common JSON case
//! a one-liner:
//!
//! ```ignore
//! #[serializer]
//! fn to_json<T: serde::Serialize>(value: &T) -> weft::Result<String> {
//!     weft::json::to_string(value)
//! }
//!
//! #[deserializer]
//! fn from_json<T: serde::de::DeserializeOwned>(content: &str) -> weft::Result<T> {
//!     weft::json::from_str(content)
//! }
//! ```

use crate::{Error, Result};

/// Serialize a value to a JSON string.
///
/// # Example
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct User { name: String }
///
/// let json = weft_core::json::to_string(&User { name: "Alice".to_string() }).expect("serialize");
/// assert_eq!(json, r#"{"name":"Alice"}"#);
/// ```
pub fn to_string<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Error::serialization)
}

/// Serialize a value to JSON bytes.
pub fn to_vec<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(Error::serialization)
}

/// Deserialize a JSON string with path-aware error messages.
pub fn from_str<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    from_slice(content.as_bytes())
}

/// Deserialize JSON bytes with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the field that failed
/// (e.g. "user.address.city").
///
/// # Example
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let user: User = weft_core::json::from_slice(br#"{"name":"Alice"}"#).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_slice<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| Error::json_deserialization(e.path().to_string(), e.inner().to_string()))
}
