//! Response adapters.
//!
//! Each function takes the in-flight response task returned by
//! [`Transport::dispatch`](crate::Transport::dispatch) and turns it into a task
//! of a different raw shape. All adapters apply the success gate (a non-2xx
//! status raises [`Error::Rest`](crate::Error::Rest)) except
//! [`call_status_code`] and [`call_response`], whose callers handle failures
//! themselves.

use bytes::Bytes;
use futures_util::StreamExt as _;
use futures_util::stream::BoxStream;
use http::StatusCode;
use tracing::warn;

use crate::{RestError, Response, Result, Task};

/// Response body as a stream of chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

fn ensure_success(response: Response) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(
        status = response.status().as_u16(),
        reason = response.reason(),
        "unsuccessful response"
    );
    Err(RestError::new(response).into())
}

/// Discard the content.
pub fn call_void(response: Task<'_, Response>) -> Task<'_, ()> {
    response.continue_with(|response| ensure_success(response?).map(drop))
}

/// Extract the content as text.
pub fn call_string(response: Task<'_, Response>) -> Task<'_, String> {
    response.continue_with(|response| ensure_success(response?)?.text())
}

/// Extract the content as a byte stream.
pub fn call_stream(response: Task<'_, Response>) -> Task<'_, ByteStream> {
    response.continue_with(|response| {
        let body = ensure_success(response?)?.into_body();
        Ok(futures_util::stream::once(async move { Ok::<_, crate::Error>(body) }).boxed())
    })
}

/// Extract the content as a byte sequence (`Vec<u8>`, [`Bytes`], ...).
pub fn call_byte_array<'a, B>(response: Task<'a, Response>) -> Task<'a, B>
where
    B: From<Bytes> + 'a,
{
    response.continue_with(|response| Ok(B::from(ensure_success(response?)?.into_body())))
}

/// Extract the content as [`Bytes`], the input of binary deserializers.
pub fn call_bytes(response: Task<'_, Response>) -> Task<'_, Bytes> {
    call_byte_array(response)
}

/// Extract the status code, whatever it is.
pub fn call_status_code(response: Task<'_, Response>) -> Task<'_, StatusCode> {
    response.continue_with(|response| Ok(response?.status()))
}

/// Keep the raw response, whatever its status.
pub fn call_response(response: Task<'_, Response>) -> Task<'_, Response> {
    response
}
