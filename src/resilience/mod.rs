//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to mirrors:
//!     → failover.rs (selected site, then every other site once, in order)
//!     → http::dispatch (one attempt per site, transport errors become 502)
//! ```
//!
//! # Design Decisions
//! - Timeouts come from the upstream client configuration
//! - Bodies are buffered before the first attempt so they can be replayed
//! - Recovery is recorded client-side (cookie), never in server state

pub mod failover;

pub use failover::{Dispatched, FailoverController, FailoverPolicy};
