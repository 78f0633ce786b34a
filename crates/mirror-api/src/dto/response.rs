//! Response DTOs.

use serde::{Deserialize, Serialize};

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Web clients currently in the registry.
    pub registered_web: usize,
    /// Desktop clients currently in the registry.
    pub registered_desktop: usize,
    /// Sessions still running, identified or not.
    pub active_sessions: usize,
}
