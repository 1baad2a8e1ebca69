//! Introspection API under `/__api__`.

pub mod handlers;

use axum::{routing::any, Router};

use self::handlers::*;
use crate::http::server::AppState;

/// Both routes answer every method, preflight `OPTIONS` included.
pub fn setup_admin_router() -> Router<AppState> {
    Router::new()
        .route("/__api__/sites", any(list_sites))
        .route("/__api__/health/{index}", any(probe_site))
}
