//! Ordered failover across mirrors.
//!
//! # Responsibilities
//! - Try the affinity-selected site first
//! - On failure, try every other site once, in registry order
//! - Persist the first fallback that works as the client's new affinity
//!
//! # State Machine
//! ```text
//! Start → forward(selected)
//!     ok                         → return as-is (no cookie)
//!     failed, one site           → return the failure
//!     failed, more sites         → forward(i) for i != selected, in order
//!         first ok               → return + Set-Cookie: selected_site=i
//!         all failed             → return the last failure
//! ```
//!
//! # Design Decisions
//! - Strictly sequential; no fan-out, no backoff, at most one pass
//! - Whether a mirror's own 502 counts as failure is a policy switch

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};

use crate::http::dispatch::{ProxyOutcome, Upstream};
use crate::http::request::ForwardRequest;
use crate::observability::metrics;
use crate::routing::affinity_cookie;
use crate::sites::SiteRegistry;

/// Which outcomes trigger failover.
#[derive(Debug, Clone, Copy)]
pub struct FailoverPolicy {
    /// Treat a 502 answered by the mirror itself like an unreachable mirror.
    pub on_upstream_502: bool,
}

impl Default for FailoverPolicy {
    fn default() -> Self {
        Self {
            on_upstream_502: true,
        }
    }
}

impl FailoverPolicy {
    pub fn is_failure(&self, outcome: &ProxyOutcome) -> bool {
        match outcome {
            ProxyOutcome::Unreachable(_) => true,
            ProxyOutcome::Upstream(r) => {
                self.on_upstream_502 && r.status() == StatusCode::BAD_GATEWAY
            }
        }
    }
}

/// Response chosen by the controller and the index of the site that produced it.
#[derive(Debug)]
pub struct Dispatched {
    pub site_index: usize,
    pub response: Response<Body>,
}

/// Drives an [`Upstream`] across the registry.
#[derive(Debug)]
pub struct FailoverController<U> {
    upstream: U,
    registry: Arc<SiteRegistry>,
    policy: FailoverPolicy,
}

impl<U: Upstream> FailoverController<U> {
    pub fn new(upstream: U, registry: Arc<SiteRegistry>, policy: FailoverPolicy) -> Self {
        Self {
            upstream,
            registry,
            policy,
        }
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    /// Forward `request`, starting at `selected` (clamped to 0 if out of range).
    pub async fn dispatch(&self, request: &ForwardRequest, selected: usize) -> Dispatched {
        let selected = if selected < self.registry.len() { selected } else { 0 };
        let site = self
            .registry
            .get(selected)
            .unwrap_or_else(|| self.registry.primary());

        let first = self.upstream.forward(request, site).await;
        if !self.policy.is_failure(&first) {
            return Dispatched {
                site_index: selected,
                response: first.into_response(),
            };
        }

        if self.registry.len() < 2 {
            tracing::warn!(
                site = %site.name,
                kind = first.kind(),
                "Only site unavailable, no fallback"
            );
            return Dispatched {
                site_index: selected,
                response: first.into_response(),
            };
        }

        tracing::warn!(
            site = %site.name,
            index = selected,
            kind = first.kind(),
            status = %first.status(),
            "Site unavailable, trying other sites"
        );

        let mut last = (selected, first);
        for (index, fallback) in self.registry.iter().filter(|(i, _)| *i != selected) {
            tracing::info!(site = %fallback.name, index, "Trying fallback site");

            let outcome = self.upstream.forward(request, fallback).await;
            if !self.policy.is_failure(&outcome) {
                tracing::info!(from = selected, to = index, site = %fallback.name, "Failed over");
                metrics::record_failover(&site.name, &fallback.name, "recovered");

                let mut response = outcome.into_response();
                response
                    .headers_mut()
                    .append(header::SET_COOKIE, affinity_cookie(index));
                return Dispatched {
                    site_index: index,
                    response,
                };
            }

            tracing::warn!(
                site = %fallback.name,
                index,
                kind = outcome.kind(),
                "Fallback site failed"
            );
            last = (index, outcome);
        }

        tracing::error!(sites = self.registry.len(), "All sites failed");
        metrics::record_failover(&site.name, "none", "exhausted");
        let (site_index, outcome) = last;
        Dispatched {
            site_index,
            response: outcome.into_response(),
        }
    }
}
