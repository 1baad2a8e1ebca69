//! Request preparation for forwarding.
//!
//! # Responsibilities
//! - Capture method, path+query and headers of the inbound request
//! - Strip headers the upstream HTTP client must own
//! - Buffer the body once so every failover attempt replays the same bytes
//!
//! # Design Decisions
//! - GET/HEAD bodies are dropped without being read
//! - Other bodies are buffered up to a configured limit; larger ones get 413
//!   before any mirror is contacted

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use http_body_util::LengthLimitError;

/// Headers that describe the client connection rather than the request.
/// The upstream client sets its own `host`, framing and compression.
static CLIENT_OWNED_HEADERS: [HeaderName; 8] = [
    header::HOST,
    header::CONTENT_LENGTH,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::TE,
    header::TRAILER,
    header::ACCEPT_ENCODING,
];

/// Non-standard hop-by-hop headers without an `http` constant.
const LEGACY_HOP_HEADERS: &[&str] = &["keep-alive", "proxy-connection"];

/// Errors raised while preparing a request for forwarding.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("request body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    Read(axum::Error),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = match self {
            RequestError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Read(_) => StatusCode::BAD_REQUEST,
        };
        (status, self.to_string()).into_response()
    }
}

/// A fully buffered, replayable request.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub method: Method,
    /// Path plus `?query` exactly as received.
    pub path_and_query: String,
    pub headers: HeaderMap,
    /// `None` for GET/HEAD.
    pub body: Option<Bytes>,
}

impl ForwardRequest {
    /// Consume an inbound request, buffering at most `max_body_bytes`.
    pub async fn buffer(
        request: Request<Body>,
        max_body_bytes: usize,
    ) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();

        let path_and_query = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let body = if carries_body(&parts.method) {
            let declared = parts
                .headers
                .get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<usize>().ok());
            if declared.is_some_and(|len| len > max_body_bytes) {
                return Err(RequestError::TooLarge {
                    limit: max_body_bytes,
                });
            }

            let bytes = axum::body::to_bytes(body, max_body_bytes)
                .await
                .map_err(|e| classify_body_error(e, max_body_bytes))?;
            Some(bytes)
        } else {
            None
        };

        Ok(Self {
            method: parts.method,
            path_and_query,
            headers: forwardable_headers(parts.headers),
            body,
        })
    }
}

/// Whether requests with `method` have their body forwarded.
pub fn carries_body(method: &Method) -> bool {
    method != Method::GET && method != Method::HEAD
}

/// Drop the headers the upstream client must set itself.
pub fn forwardable_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in &CLIENT_OWNED_HEADERS {
        headers.remove(name);
    }
    for name in LEGACY_HOP_HEADERS {
        headers.remove(*name);
    }
    headers
}

fn classify_body_error(err: axum::Error, limit: usize) -> RequestError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return RequestError::TooLarge { limit };
        }
        source = e.source();
    }
    RequestError::Read(err)
}
