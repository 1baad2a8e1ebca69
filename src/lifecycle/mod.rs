//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Merge CLI/env → Validate → Build registry → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - SIGTERM and SIGINT both trigger graceful shutdown

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
