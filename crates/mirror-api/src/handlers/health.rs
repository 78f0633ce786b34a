//! Health check and metrics handlers.

use axum::Json;
use axum::extract::State;

use mirror_core::types::Mode;
use mirror_realtime::metrics::MetricsSnapshot;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let engine = &state.engine;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        registered_web: engine.registry.count(Mode::Web),
        registered_desktop: engine.registry.count(Mode::Desktop),
        active_sessions: engine.supervisor.active_count(),
    })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.engine.metrics.snapshot())
}
