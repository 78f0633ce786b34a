//! Relay engine configuration.

use serde::{Deserialize, Serialize};

/// Relay (WebSocket) engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Path of the WebSocket upgrade endpoint.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
    /// Per-connection outbound queue capacity. Messages beyond it are dropped.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ws_path: default_ws_path(),
            outbound_buffer_size: default_outbound_buffer(),
        }
    }
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_outbound_buffer() -> usize {
    256
}
