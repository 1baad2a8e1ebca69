//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the site list parses into a non-empty registry
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs after file, environment and CLI values are merged

use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;
use crate::sites::SiteError;

/// A single semantic problem in the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no sites configured (set `sites`, PROXY_SITES or --sites)")]
    MissingSites,

    #[error("invalid site list: {0}")]
    Sites(#[from] SiteError),

    #[error("invalid {field} {value:?}: expected host:port")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Check a merged configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.sites.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingSites),
        Some(_) => {
            if let Err(e) = config.site_registry() {
                errors.push(e.into());
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    let positive = [
        ("upstream.connect_timeout_secs", config.upstream.connect_timeout_secs),
        ("upstream.request_timeout_secs", config.upstream.request_timeout_secs),
        ("upstream.max_body_bytes", config.upstream.max_body_bytes as u64),
        ("health_probe.timeout_ms", config.health_probe.timeout_ms),
        ("timeouts.request_secs", config.timeouts.request_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero(field));
        }
    }

    if !matches!(
        config.observability.log_level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    ) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ProxyConfig {
        ProxyConfig {
            sites: Some("a|https://a.example,b|https://b.example".to_string()),
            ..ProxyConfig::default()
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_sites() {
        let mut config = valid();
        config.sites = None;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::MissingSites]));

        config.sites = Some("  ".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::MissingSites]));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.sites = Some("broken".to_string());
        config.listener.bind_address = "nowhere".to_string();
        config.health_probe.timeout_ms = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::Sites(SiteError::Malformed { .. })));
        assert!(matches!(
            errors[1],
            ValidationError::InvalidAddress {
                field: "listener.bind_address",
                ..
            }
        ));
        assert!(matches!(errors[2], ValidationError::Zero("health_probe.timeout_ms")));
        assert!(matches!(errors[3], ValidationError::LogLevel(_)));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "bad".to_string();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
