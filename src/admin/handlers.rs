use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;

const CORS_OPEN: (header::HeaderName, HeaderValue) = (
    header::ACCESS_CONTROL_ALLOW_ORIGIN,
    HeaderValue::from_static("*"),
);

/// `/__api__/sites`: the registry in configured order.
pub async fn list_sites(State(state): State<AppState>) -> Response {
    ([CORS_OPEN], Json(state.registry.as_ref())).into_response()
}

/// `/__api__/health/{index}`: probe one site. Probe failures are reported
/// in the body with HTTP 200; only an unknown index is a 404.
pub async fn probe_site(State(state): State<AppState>, Path(index): Path<String>) -> Response {
    let Some(site) = index.parse::<usize>().ok().and_then(|i| state.registry.get(i)) else {
        tracing::debug!(index = %index, "Health probe for unknown site");
        return site_not_found();
    };

    let result = state.probe.probe(site).await;
    ([CORS_OPEN], Json(result)).into_response()
}

/// JSON 404 for a health request that names no configured site.
pub fn site_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Site not found" })),
    )
        .into_response()
}
