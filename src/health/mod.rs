//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! GET /__api__/health/{index}
//!     → registry lookup (404 if out of range)
//!     → probe.rs (HEAD with deadline)
//!     → HealthResult as JSON, always HTTP 200
//! ```
//!
//! # Design Decisions
//! - Probes are on demand, driven by the landing page; there is no
//!   background monitor and no stored health state
//! - Probe results never influence routing; failover is reactive only

pub mod probe;

pub use probe::{HealthProbe, HealthResult};
