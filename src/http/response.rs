//! Response construction and transformation.
//!
//! # Responsibilities
//! - Build the canonicalizing 301 redirect
//! - Strip hop-by-hop headers from origin responses
//! - Map edge failures to status codes
//!
//! # Design Decisions
//! - Origin bodies are streamed, never buffered
//! - Redirects carry an empty body

use axum::{
    body::{Body, Bytes, HttpBody},
    http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};

/// Hop-by-hop headers (RFC 9110 §7.6.1) never forwarded in either direction.
const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(name)
}

/// Remove hop-by-hop headers in place.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP.iter() {
        headers.remove(name);
    }
}

/// 301 Moved Permanently pointing at `location`.
///
/// Falls back to 500 if `location` is not a valid header value, which cannot
/// happen for locations derived from a parsed request URI.
pub fn moved_permanently(location: &str) -> Response<Body> {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect location is not a valid header value");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub fn bad_request(message: &'static str) -> Response<Body> {
    (StatusCode::BAD_REQUEST, message).into_response()
}

pub fn bad_gateway() -> Response<Body> {
    (StatusCode::BAD_GATEWAY, "Origin request failed").into_response()
}

/// Convert an origin response for the client.
pub fn from_origin<B>(response: Response<B>) -> Response<Body>
where
    B: HttpBody<Data = Bytes> + Send + 'static,
    B::Error: Into<axum::BoxError>,
{
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}
