//! Mirror site registry.
//!
//! # Data Flow
//! ```text
//! "name|url, name|url" (config / PROXY_SITES)
//!     → site.rs (parse & validate each entry)
//!     → registry.rs (ordered, non-empty, immutable)
//!     → shared via Arc to dispatcher, probe and API handlers
//! ```
//!
//! # Design Decisions
//! - A site's identity is its index; clients only ever see indices
//! - Order is significant: index 0 is the default, fallbacks go in order
//! - The configured url string is kept verbatim (it is also the rewrite needle)

pub mod registry;
pub mod site;

pub use registry::SiteRegistry;
pub use site::{parse_sites, Site, SiteError};
