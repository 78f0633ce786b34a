//! Application state shared across all handlers.

use std::sync::Arc;

use mirror_core::config::AppConfig;
use mirror_realtime::server::RelayEngine;

/// Shared application state passed to every handler via Axum's `State`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Relay engine (registry, sessions, metrics).
    pub engine: RelayEngine,
}

impl AppState {
    /// Builds the state and its relay engine from configuration.
    pub fn new(config: AppConfig) -> Self {
        let engine = RelayEngine::new(config.relay.clone());
        Self {
            config: Arc::new(config),
            engine,
        }
    }
}
