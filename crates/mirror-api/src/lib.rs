//! # mirror-api
//!
//! HTTP layer of the mirror relay built on Axum.
//!
//! Provides the WebSocket upgrade endpoint that feeds the relay engine,
//! health and metrics endpoints, the static fixture server, and the
//! startup/shutdown wiring for both listeners.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod net;
pub mod router;
pub mod state;

pub use app::{RunningServer, run_server, start_server};
pub use state::AppState;
