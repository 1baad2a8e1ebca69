//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path, cookies)
//!     → admin routes (/__api__/*) answered directly by the HTTP server
//!     → gate.rs (landing / reserved / proxy)
//!     → affinity.rs (which site index to try first)
//!     → failover controller
//! ```
//!
//! # Design Decisions
//! - Deterministic: same path and cookies always take the same route
//! - No server-side session state; the cookie is the only affinity record

pub mod affinity;
pub mod gate;

pub use affinity::{affinity_cookie, has_just_tested, SessionAffinity};
pub use gate::{classify, RouteDecision};
