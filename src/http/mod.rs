//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → /__api__/* handled by admin
//!     → routing::gate (landing / reserved → platform.rs)
//!     → request.rs (buffer, strip client-owned headers)
//!     → resilience::failover → dispatch.rs (one mirror per attempt)
//!     → response.rs (header policy) + rewrite.rs (HTML only)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod platform;
pub mod request;
pub mod response;
pub mod rewrite;
pub mod server;

pub use dispatch::{ProxyDispatcher, ProxyOutcome, Upstream};
pub use request::ForwardRequest;
pub use rewrite::ResponseRewriter;
pub use server::{AppState, HttpServer};
