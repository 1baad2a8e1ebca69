//! On-demand health probing of one mirror.
//!
//! # Responsibilities
//! - HEAD the site's origin within a fixed deadline
//! - Report status, reachability and latency as a value
//!
//! # Design Decisions
//! - Failures are data, never errors: callers always get a `HealthResult`
//! - The deadline cancels the in-flight request when it expires
//! - An unreachable site reports `latency: null` (no finite latency)

use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::time;

use crate::observability::metrics;
use crate::sites::Site;

/// Outcome of a single probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResult {
    pub name: String,
    pub url: String,
    pub status: u16,
    pub ok: bool,
    /// Milliseconds; `None` (serialised as `null`) when the site did not answer.
    pub latency: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResult {
    fn unreachable(site: &Site, error: String) -> Self {
        Self {
            name: site.name.clone(),
            url: site.url.clone(),
            status: 500,
            ok: false,
            latency: None,
            error: Some(error),
        }
    }
}

/// Issues time-bounded liveness checks.
#[derive(Debug, Clone)]
pub struct HealthProbe {
    client: reqwest::Client,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub async fn probe(&self, site: &Site) -> HealthResult {
        let start = Instant::now();
        let request = self
            .client
            .head(&site.url)
            .header(reqwest::header::USER_AGENT, "mirror-proxy-health-check")
            .send();

        let result = match time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => {
                let status = response.status();
                HealthResult {
                    name: site.name.clone(),
                    url: site.url.clone(),
                    status: status.as_u16(),
                    ok: status.is_success(),
                    latency: Some(start.elapsed().as_millis() as u64),
                    error: None,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    site = %site.name,
                    error = %e,
                    "Health probe failed: connection error"
                );
                HealthResult::unreachable(site, e.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    site = %site.name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Health probe failed: timeout"
                );
                HealthResult::unreachable(
                    site,
                    format!("probe timed out after {}ms", self.timeout.as_millis()),
                )
            }
        };

        metrics::record_probe(&site.name, result.ok, result.latency);
        result
    }
}
