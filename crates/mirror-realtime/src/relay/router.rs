//! Relay router: forwards a message to the sender's mirror peer.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use mirror_core::types::{ClientId, Mode};

use crate::connection::handle::DeliveryError;
use crate::connection::registry::ConnectionRegistry;
use crate::metrics::EngineMetrics;

/// What happened to a forwarded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Queued on the mirror peer's connection.
    Delivered,
    /// No mirror peer is registered; the message is gone.
    PeerAbsent,
    /// The mirror peer exists but could not take the message.
    PeerUnavailable,
}

/// Resolves mirror peers through the registry and hands them messages.
///
/// Fire-and-forget: nothing is retried, queued for absent peers, or
/// reported back to the sender.
#[derive(Debug)]
pub struct RelayRouter {
    registry: Arc<ConnectionRegistry>,
    metrics: Arc<EngineMetrics>,
}

impl RelayRouter {
    /// Creates a router over the given registry.
    pub fn new(registry: Arc<ConnectionRegistry>, metrics: Arc<EngineMetrics>) -> Self {
        Self { registry, metrics }
    }

    /// Forwards `message` from `(sender_mode, id)` to `(sender_mode.mirror(), id)`.
    pub fn forward(&self, sender_mode: Mode, id: &ClientId, message: &Value) -> RelayOutcome {
        let mirror_mode = sender_mode.mirror();

        let Some(peer) = self.registry.lookup(mirror_mode, id.as_str()) else {
            debug!(client = %id, mode = %mirror_mode, "Client {}[{}] not connected", id, mirror_mode);
            self.metrics.record_peer_absent();
            return RelayOutcome::PeerAbsent;
        };

        match peer.send(message.to_string()) {
            Ok(()) => {
                trace!(conn_id = %peer.id, client = %peer.tag(), "Message relayed");
                self.metrics.record_relayed();
                RelayOutcome::Delivered
            }
            Err(DeliveryError::Full) | Err(DeliveryError::Closed) => {
                debug!(conn_id = %peer.id, client = %peer.tag(), "Mirror peer unavailable, message dropped");
                self.metrics.record_peer_unavailable();
                RelayOutcome::PeerUnavailable
            }
        }
    }
}
