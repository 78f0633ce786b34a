//! Route definitions for the relay port and the static file port.

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use mirror_core::config::StaticFilesConfig;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Router for the relay port: WebSocket upgrade, health, metrics.
pub fn build_relay_router(state: AppState) -> Router {
    let ws_path = state.config.relay.ws_path.clone();

    Router::new()
        .route(&ws_path, get(handlers::ws::ws_upgrade))
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::health::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the static fixture server. Directories serve `index.html`.
pub fn build_static_router(config: &StaticFilesConfig) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(&config.root).append_index_html_on_directories(true))
        .layer(build_cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
}
