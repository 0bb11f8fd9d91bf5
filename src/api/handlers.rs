use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

use crate::boundary::BoundaryPolicy;
use crate::origin::OriginProxy;

lazy_static::lazy_static! {
    static ref START_TIME: Instant = Instant::now();
}

const SERVICE_NAME: &str = "error-boundary";

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    /// Remote origin; `None` means requests are served from `static_dir`
    pub origin: Option<OriginProxy>,
    pub static_dir: String,
    pub policy: BoundaryPolicy,
    pub instance_id: String,
}

impl AppStateInner {
    fn downstream_label(&self) -> String {
        match &self.origin {
            Some(proxy) => format!("origin:{}", proxy.base_url()),
            None => format!("static:{}", self.static_dir),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub instance_id: String,
    pub downstream: String,
    pub uptime_seconds: u64,
}

fn health_document(state: &AppStateInner, status: &'static str) -> HealthResponse {
    HealthResponse {
        status,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        instance_id: state.instance_id.clone(),
        downstream: state.downstream_label(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    }
}

/// Overall health of the service
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(health_document(&state, "healthy"))
}

/// Liveness probe
pub async fn health_live(State(state): State<AppState>) -> impl IntoResponse {
    Json(health_document(&state, "alive"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_document_for_static_downstream() {
        let state = AppStateInner {
            origin: None,
            static_dir: "public".to_string(),
            policy: BoundaryPolicy::default(),
            instance_id: "edge-1".to_string(),
        };

        let doc = health_document(&state, "healthy");
        assert_eq!(doc.service, "error-boundary");
        assert_eq!(doc.instance_id, "edge-1");
        assert_eq!(doc.downstream, "static:public");
    }
}
