//! Listener configuration.

use serde::{Deserialize, Serialize};

/// Bind address and ports for the relay and the static file server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address shared by both listeners.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// WebSocket relay port.
    #[serde(default = "default_relay_port")]
    pub relay_port: u16,
    /// Static file server port.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// How long shutdown waits for live sessions to close, in seconds.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            relay_port: default_relay_port(),
            http_port: default_http_port(),
            shutdown_grace_seconds: default_shutdown_grace(),
        }
    }
}

impl ServerConfig {
    /// `host:port` for the relay listener.
    pub fn relay_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.relay_port)
    }

    /// `host:port` for the static file listener.
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.http_port)
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_relay_port() -> u16 {
    9000
}

fn default_http_port() -> u16 {
    8000
}

fn default_shutdown_grace() -> u64 {
    10
}
