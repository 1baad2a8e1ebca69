//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the introspection API and the gateway fallback
//! - Wire up middleware (request ID, tracing, request deadline)
//! - Gate requests: landing / reserved paths go to the static platform
//! - Dispatch everything else through the failover controller
//! - Serve until the shutdown signal fires

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::handlers::site_not_found;
use crate::admin::setup_admin_router;
use crate::config::ProxyConfig;
use crate::health::HealthProbe;
use crate::http::dispatch::ProxyDispatcher;
use crate::http::platform::StaticPlatform;
use crate::http::request::ForwardRequest;
use crate::observability::metrics;
use crate::resilience::FailoverController;
use crate::routing::{classify, RouteDecision, SessionAffinity};
use crate::sites::SiteRegistry;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SiteRegistry>,
    pub affinity: SessionAffinity,
    pub failover: Arc<FailoverController<ProxyDispatcher>>,
    pub probe: Arc<HealthProbe>,
    pub platform: StaticPlatform,
    pub max_body_bytes: usize,
}

/// HTTP server for the mirror proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server for `registry` with the given configuration.
    pub fn new(config: ProxyConfig, registry: SiteRegistry) -> Result<Self, reqwest::Error> {
        let registry = Arc::new(registry);
        let dispatcher = ProxyDispatcher::new(&config.upstream)?;
        let probe = HealthProbe::new(
            dispatcher.client().clone(),
            Duration::from_millis(config.health_probe.timeout_ms),
        );

        let state = AppState {
            affinity: SessionAffinity::new(registry.len()),
            failover: Arc::new(FailoverController::new(
                dispatcher,
                registry.clone(),
                config.failover_policy(),
            )),
            probe: Arc::new(probe),
            platform: StaticPlatform::new(config.platform.static_dir.clone()),
            max_body_bytes: config.upstream.max_body_bytes,
            registry,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        setup_admin_router()
            .fallback(gateway_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Everything that is not an introspection call.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match classify(request.uri().path(), request.headers()) {
        RouteDecision::Landing | RouteDecision::Reserved => state.platform.serve(request).await,
        RouteDecision::UnknownSite => site_not_found(),
        RouteDecision::Proxy => proxy_handler(state, request).await,
    }
}

/// Resolve affinity, buffer the request and run the failover chain.
async fn proxy_handler(state: AppState, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().to_string();
    let selected = state.affinity.resolve(request.headers());

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        selected,
        "Proxying request"
    );

    let forward = match ForwardRequest::buffer(request, state.max_body_bytes).await {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
            return e.into_response();
        }
    };

    let dispatched = state.failover.dispatch(&forward, selected).await;
    let site = state
        .registry
        .get(dispatched.site_index)
        .map(|s| s.name.as_str())
        .unwrap_or("unknown");
    metrics::record_request(&method, dispatched.response.status().as_u16(), site, start_time);

    dispatched.response
}
