//! Cookie-based session affinity.
//!
//! # Responsibilities
//! - Read the client's sticky site index from the `selected_site` cookie
//! - Detect the `just_tested` marker left by the landing page
//! - Render the `Set-Cookie` value that persists a new affinity
//!
//! # Design Decisions
//! - Cookies are untrusted input: the index is re-validated on every request
//! - Resolution never fails; anything unusable degrades to index 0

use axum::http::{header, HeaderMap, HeaderValue};

/// Cookie carrying the sticky site index.
pub const AFFINITY_COOKIE: &str = "selected_site";

/// Short-lived cookie set by the landing page once a site has been chosen.
pub const JUST_TESTED_COOKIE: &str = "just_tested";

/// Resolves which site a request should be routed to.
#[derive(Debug, Clone, Copy)]
pub struct SessionAffinity {
    site_count: usize,
}

impl SessionAffinity {
    pub fn new(site_count: usize) -> Self {
        Self { site_count }
    }

    /// Index from the `selected_site` cookie if it names a configured site,
    /// otherwise 0.
    pub fn resolve(&self, headers: &HeaderMap) -> usize {
        cookie_value(headers, AFFINITY_COOKIE)
            .filter(|v| !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&index| index < self.site_count)
            .unwrap_or(0)
    }
}

/// True if the request carries `just_tested=true`.
pub fn has_just_tested(headers: &HeaderMap) -> bool {
    cookie_value(headers, JUST_TESTED_COOKIE) == Some("true")
}

/// `Set-Cookie` value recording `index` as the client's new affinity.
pub fn affinity_cookie(index: usize) -> HeaderValue {
    // Only ASCII digits and fixed text: always a valid header value.
    HeaderValue::from_str(&format!("{AFFINITY_COOKIE}={index}; path=/; SameSite=Lax"))
        .unwrap_or_else(|_| HeaderValue::from_static("selected_site=0; path=/; SameSite=Lax"))
}

/// First value of cookie `name` across all `Cookie` headers.
fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .find_map(|pair| {
            let (k, v) = pair.trim().split_once('=')?;
            (k.trim() == name).then(|| v.trim())
        })
}
