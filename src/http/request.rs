//! Request identification and forwarding headers.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Copy client headers for the origin, minus hop-by-hop headers
//! - Append the peer address to X-Forwarded-For
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Original request preserved for logging; modified copy forwarded

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::is_hop_by_hop;

/// Header carrying the request ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Header listing the client and proxies a request passed through.
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Makes UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID header value, or "unknown".
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(&X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Headers to send to the origin for a client request.
pub fn forward_headers(client: &HeaderMap, peer: SocketAddr, host_override: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(client.len() + 1);
    for (name, value) in client.iter() {
        if !is_hop_by_hop(name) {
            headers.append(name.clone(), value.clone());
        }
    }

    let peer_ip = peer.ip().to_string();
    let forwarded_for = match client.get(&X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
        Some(existing) => format!("{}, {}", existing, peer_ip),
        None => peer_ip,
    };
    if let Ok(value) = HeaderValue::from_str(&forwarded_for) {
        headers.insert(X_FORWARDED_FOR, value);
    }

    if let Some(host) = host_override.and_then(|h| HeaderValue::from_str(h).ok()) {
        headers.insert(header::HOST, host);
    }

    headers
}
