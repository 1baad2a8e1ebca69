//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mirror_proxy_requests_total` (counter): proxied requests by method, status, site
//! - `mirror_proxy_request_duration_seconds` (histogram): end-to-end latency incl. failover
//! - `mirror_proxy_failover_total` (counter): failover chains by origin site and outcome
//! - `mirror_proxy_probe_latency_seconds` (histogram): successful probe latency per site
//! - `mirror_proxy_probe_failures_total` (counter): failed probes per site
//!
//! Recording is a no-op until `init_metrics` installs the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_request(method: &str, status: u16, site: &str, start: Instant) {
    counter!(
        "mirror_proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "site" => site.to_string()
    )
    .increment(1);
    histogram!(
        "mirror_proxy_request_duration_seconds",
        "method" => method.to_string(),
        "site" => site.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_failover(from: &str, to: &str, outcome: &'static str) {
    counter!(
        "mirror_proxy_failover_total",
        "from" => from.to_string(),
        "to" => to.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_probe(site: &str, ok: bool, latency_ms: Option<u64>) {
    match latency_ms {
        Some(ms) if ok => {
            histogram!("mirror_proxy_probe_latency_seconds", "site" => site.to_string())
                .record(ms as f64 / 1000.0);
        }
        _ => {
            counter!("mirror_proxy_probe_failures_total", "site" => site.to_string()).increment(1);
        }
    }
}
