//! Static platform: target for requests the proxy does not forward.
//!
//! The landing page (`/` before a site was picked) and the reserved paths are
//! served from a local directory. Without a directory every delegated request
//! answers 404.

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    response::IntoResponse,
};
use tower::ServiceExt;
use tower_http::services::ServeDir;

#[derive(Debug, Clone)]
pub struct StaticPlatform {
    files: Option<ServeDir>,
}

impl StaticPlatform {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            files: dir.map(ServeDir::new),
        }
    }

    /// Serve a delegated request.
    pub async fn serve(&self, request: Request<Body>) -> Response<Body> {
        let Some(files) = self.files.clone() else {
            return StatusCode::NOT_FOUND.into_response();
        };
        match files.oneshot(request).await {
            Ok(response) => response.map(Body::new),
            Err(never) => match never {},
        }
    }
}
