//! Forwarding of one request to one mirror.
//!
//! # Responsibilities
//! - Build the upstream target as `site.url + path + query`
//! - Send method, headers and (for non-GET/HEAD) the buffered body
//! - Apply the response header policy
//! - Buffer and rewrite HTML bodies; stream everything else
//! - Turn transport failures into a 502 instead of an error
//!
//! # Timeouts
//! The request deadline covers waiting for the mirror's response head and
//! buffering an HTML body. A streamed body is already committed to the client
//! and is never cut off by it.
//!
//! # Design Decisions
//! - `Upstream` is the seam the failover controller is generic over
//! - Upstream status codes are passed through untouched; the outcome tag
//!   records whether the 502 came from the mirror or from the transport

use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use axum::{
    body::Body,
    http::{header, Method, Response, StatusCode},
};

use crate::config::UpstreamConfig;
use crate::http::request::{carries_body, ForwardRequest};
use crate::http::response::{apply_header_policy, bad_gateway, is_html};
use crate::sites::Site;

/// Transport-level failures while talking to a mirror.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("request to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {target} timed out after {after:?}")]
    Timeout { target: String, after: Duration },

    #[error("reading response body from {target} failed: {source}")]
    Body {
        target: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of one forwarding attempt.
#[derive(Debug)]
pub enum ProxyOutcome {
    /// The mirror answered; its status is passed through.
    Upstream(Response<Body>),
    /// The mirror could not be reached; always a 502.
    Unreachable(Response<Body>),
}

impl ProxyOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyOutcome::Upstream(r) | ProxyOutcome::Unreachable(r) => r.status(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyOutcome::Upstream(_) => "upstream",
            ProxyOutcome::Unreachable(_) => "unreachable",
        }
    }

    pub fn into_response(self) -> Response<Body> {
        match self {
            ProxyOutcome::Upstream(r) | ProxyOutcome::Unreachable(r) => r,
        }
    }
}

/// Something that can forward a request to a site.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, request: &ForwardRequest, site: &Site) -> ProxyOutcome;
}

/// Forwards requests over HTTP(S) with a shared connection pool.
#[derive(Debug, Clone)]
pub struct ProxyDispatcher {
    client: reqwest::Client,
    request_timeout: Duration,
}

impl ProxyDispatcher {
    /// Build the upstream client from configuration.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    /// The underlying client, shared with the health probe.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn try_forward(
        &self,
        request: &ForwardRequest,
        site: &Site,
    ) -> Result<Response<Body>, DispatchError> {
        let target = format!("{}{}", site.url, request.path_and_query);

        let mut builder = self
            .client
            .request(request.method.clone(), &target)
            .headers(request.headers.clone());
        if carries_body(&request.method) {
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }
        }

        let upstream = match time::timeout(self.request_timeout, builder.send()).await {
            Ok(sent) => sent.map_err(|source| DispatchError::Transport {
                target: target.clone(),
                source,
            })?,
            Err(_) => {
                return Err(DispatchError::Timeout {
                    target,
                    after: self.request_timeout,
                })
            }
        };

        let status = upstream.status();
        let mut headers = upstream.headers().clone();
        apply_header_policy(&mut headers);

        let body = if is_html(&headers) {
            let raw = match time::timeout(self.request_timeout, upstream.bytes()).await {
                Ok(read) => read.map_err(|source| DispatchError::Body {
                    target: target.clone(),
                    source,
                })?,
                Err(_) => {
                    return Err(DispatchError::Timeout {
                        target,
                        after: self.request_timeout,
                    })
                }
            };
            if request.method != Method::HEAD {
                headers.remove(header::CONTENT_LENGTH);
            }
            Body::from(site.rewriter().rewrite(raw))
        } else {
            Body::from_stream(upstream.bytes_stream())
        };

        tracing::debug!(
            site = %site.name,
            target = %target,
            status = %status,
            "Upstream responded"
        );

        let mut response = Response::new(body);
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

#[async_trait]
impl Upstream for ProxyDispatcher {
    async fn forward(&self, request: &ForwardRequest, site: &Site) -> ProxyOutcome {
        match self.try_forward(request, site).await {
            Ok(response) => ProxyOutcome::Upstream(response),
            Err(e) => {
                tracing::warn!(site = %site.name, error = %e, "Upstream unreachable");
                ProxyOutcome::Unreachable(bad_gateway(&e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[tokio::test]
    async fn test_unreachable_site_becomes_502() {
        let dispatcher = ProxyDispatcher::new(&UpstreamConfig::default()).unwrap();
        // Port 1 on loopback: connection refused.
        let site = Site::new("dead", "http://127.0.0.1:1").unwrap();
        let request = ForwardRequest {
            method: Method::GET,
            path_and_query: "/x".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };

        let outcome = dispatcher.forward(&request, &site).await;
        assert!(matches!(outcome, ProxyOutcome::Unreachable(_)));
        assert_eq!(outcome.status(), StatusCode::BAD_GATEWAY);
    }
}
