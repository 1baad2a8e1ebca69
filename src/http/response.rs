//! Response handling and transformation.
//!
//! # Responsibilities
//! - Apply the mirror header policy (framing allowed, CORS open)
//! - Strip hop-by-hop headers from upstream responses
//! - Build the 502 returned when a mirror cannot be reached
//!
//! # Design Decisions
//! - CSP and X-Frame-Options are removed so mirrored pages can be embedded
//!   under the proxy's own origin
//! - Errors are plain text; introspection endpoints use JSON instead

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode},
};

/// Upstream headers that must not reach the client.
static REMOVED_HEADERS: [HeaderName; 7] = [
    header::CONTENT_SECURITY_POLICY,
    header::X_FRAME_OPTIONS,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
];

/// Rewrite upstream response headers in place.
pub fn apply_header_policy(headers: &mut HeaderMap) {
    for name in &REMOVED_HEADERS {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
}

/// True if the content type marks a body that gets rewritten.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"))
}

/// 502 carrying a human-readable reason.
pub fn bad_gateway(reason: &str) -> Response<Body> {
    let mut response = Response::new(Body::from(format!("proxy error: {reason}")));
    *response.status_mut() = StatusCode::BAD_GATEWAY;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
