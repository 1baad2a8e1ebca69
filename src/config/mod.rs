//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flags / environment override (main.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → SiteRegistry built once and shared via Arc
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{finalize, load_config, ConfigError};
pub use schema::{
    HealthProbeConfig, ListenerConfig, ObservabilityConfig, PlatformConfig, ProxyConfig,
    TimeoutConfig, UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
