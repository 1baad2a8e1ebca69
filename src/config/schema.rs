//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::resilience::FailoverPolicy;
use crate::sites::{SiteError, SiteRegistry};

/// Root configuration for the mirror proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Mirror list as `name|url` pairs separated by commas.
    pub sites: Option<String>,

    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Upstream client settings.
    pub upstream: UpstreamConfig,

    /// Health probe settings.
    pub health_probe: HealthProbeConfig,

    /// Server-wide timeouts.
    pub timeouts: TimeoutConfig,

    /// Static file root for delegated requests.
    pub platform: PlatformConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Build the site registry from the configured list.
    pub fn site_registry(&self) -> Result<SiteRegistry, SiteError> {
        SiteRegistry::from_list(self.sites.as_deref().unwrap_or_default())
    }

    pub fn failover_policy(&self) -> FailoverPolicy {
        FailoverPolicy {
            on_upstream_502: self.upstream.failover_on_upstream_502,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Settings for requests sent to mirrors.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Seconds a mirror has to send its response head (and a buffered HTML
    /// body). Streamed bodies are not bounded by it.
    pub request_timeout_secs: u64,

    /// Largest request body buffered for replay across failover attempts.
    pub max_body_bytes: usize,

    /// Fail over when a mirror itself answers 502, not only when unreachable.
    pub failover_on_upstream_502: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
            failover_on_upstream_502: true,
        }
    }
}

/// Health probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthProbeConfig {
    /// Deadline for a single probe in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HealthProbeConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000 }
    }
}

/// Timeout configuration for the server itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request deadline in seconds, failover chain included.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 120 }
    }
}

/// Static platform configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Directory holding the landing page and reserved assets.
    pub static_dir: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
