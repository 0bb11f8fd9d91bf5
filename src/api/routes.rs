use axum::{
    extract::Request,
    middleware,
    response::IntoResponse,
    routing::get,
    Router,
};
use tower::{BoxError, Layer, Service};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{health, health_live, AppState};
use super::middleware::logging_middleware;
use crate::boundary::ErrorBoundaryLayer;
use crate::metrics;
use crate::static_files::StaticFiles;

/// Router for the configured downstream: the origin when set, else static files
pub fn create_router(state: AppState) -> Router {
    match state.origin.clone() {
        Some(proxy) => create_router_with_downstream(state, proxy),
        None => {
            let files = StaticFiles::new(&state.static_dir);
            create_router_with_downstream(state, files)
        }
    }
}

/// Router that sends every unmatched request to `downstream`, behind the
/// error boundary configured in `state.policy`
pub fn create_router_with_downstream<S>(state: AppState, downstream: S) -> Router
where
    S: Service<Request> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Error: Into<BoxError>,
    S::Future: Send,
{
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let boundary = ErrorBoundaryLayer::new(state.policy);

    Router::new()
        // Health check
        .route("/health", get(health))
        .route("/health/live", get(health_live))
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        // Everything else goes to the downstream
        .fallback_service(boundary.layer(downstream))
        // Add middleware (order matters: logging -> metrics -> cors -> trace)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics::middleware::track_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // Add shared state
        .with_state(state)
}
