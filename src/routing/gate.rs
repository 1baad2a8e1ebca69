//! Route gating for requests that are not introspection calls.
//!
//! # Responsibilities
//! - Keep reserved paths (static index, favicon, `/__*`) away from mirrors
//! - Catch health paths the introspection router could not match
//! - Hold the landing route back until the landing page has done its job
//! - Send everything else to the failover controller
//!
//! # Design Decisions
//! - Pure function of path and headers
//! - Prefix matching only, checked in a fixed order

use axum::http::HeaderMap;

use super::affinity::has_just_tested;

/// Paths that are always served by the static platform.
const RESERVED_PATHS: &[&str] = &["/index.html", "/favicon.ico"];

/// Health API prefix. Requests under it that reach the gate carry no usable
/// site index (`/__api__/health/`, `/__api__/health/0/`, ...).
const HEALTH_PREFIX: &str = "/__api__/health/";

/// Namespace owned by the proxy itself; never forwarded upstream.
const INTERNAL_PREFIX: &str = "/__";

/// What to do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// `/` without the `just_tested` marker: show the landing page.
    Landing,
    /// Health path without a single site index segment.
    UnknownSite,
    /// Reserved asset or internal namespace.
    Reserved,
    /// Forward to a mirror.
    Proxy,
}

/// Decide how to serve `path`.
pub fn classify(path: &str, headers: &HeaderMap) -> RouteDecision {
    if path == "/" {
        return if has_just_tested(headers) {
            RouteDecision::Proxy
        } else {
            RouteDecision::Landing
        };
    }

    if path.starts_with(HEALTH_PREFIX) {
        return RouteDecision::UnknownSite;
    }

    if RESERVED_PATHS.contains(&path) || path.starts_with(INTERNAL_PREFIX) {
        return RouteDecision::Reserved;
    }

    RouteDecision::Proxy
}
