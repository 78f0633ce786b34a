//! # mirror-realtime
//!
//! Real-time engine of the mirror relay. Provides:
//!
//! - A per-mode connection registry keyed by client id
//! - The per-connection session state machine (identify, relay, cleanup)
//! - The relay router that forwards each message to the mirror peer
//! - A session supervisor for bulk shutdown and leak detection
//! - Engine metrics counters
//!
//! The engine is transport-agnostic: sessions run over any stream of
//! [`InboundFrame`]s and any sink of [`OutboundFrame`]s.

pub mod connection;
pub mod message;
pub mod metrics;
pub mod relay;
pub mod server;
pub mod session;

pub use connection::handle::ConnectionHandle;
pub use connection::registry::ConnectionRegistry;
pub use message::frame::{InboundFrame, OutboundFrame};
pub use metrics::EngineMetrics;
pub use relay::router::{RelayOutcome, RelayRouter};
pub use server::RelayEngine;
pub use session::supervisor::SessionSupervisor;
