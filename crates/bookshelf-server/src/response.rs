//! Response builders shared by the handlers.
//!
//! Plain-text error bodies end with a newline and carry
//! `X-Content-Type-Options: nosniff`. JSON bodies also end with a newline.

use bytes::Bytes;
use http::header::{self, HeaderValue};
use http::{Method, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

fn with_body(status: StatusCode, content_type: Option<&'static str>, body: Bytes) -> HttpResponse {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    }
    response
}

/// Serializes `value` as a JSON response terminated by a newline.
///
/// # Errors
///
/// Returns the serializer error if `value` cannot be encoded.
pub fn json<T: Serialize + ?Sized>(
    status: StatusCode,
    value: &T,
) -> Result<HttpResponse, serde_json::Error> {
    let mut body = serde_json::to_vec(value)?;
    body.push(b'\n');
    Ok(with_body(status, Some(APPLICATION_JSON), Bytes::from(body)))
}

/// A plain-text error response; a trailing newline is appended to `message`.
pub fn text_error(status: StatusCode, message: &str) -> HttpResponse {
    let mut response = with_body(
        status,
        Some(TEXT_PLAIN),
        Bytes::from(format!("{message}\n")),
    );
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// The `404 page not found` response for unrouted paths.
pub fn not_found() -> HttpResponse {
    text_error(StatusCode::NOT_FOUND, "404 page not found")
}

/// An HTML response.
pub fn html(status: StatusCode, body: impl Into<Bytes>) -> HttpResponse {
    with_body(status, Some(TEXT_HTML), body.into())
}

/// A response with no body and no content type.
pub fn empty(status: StatusCode) -> HttpResponse {
    with_body(status, None, Bytes::new())
}

/// A `405` response with an empty body listing `allowed` in `Allow`.
pub fn method_not_allowed(allowed: &[Method]) -> HttpResponse {
    let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
    let joined = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if let Ok(value) = HeaderValue::from_str(&joined) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}
