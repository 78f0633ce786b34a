//! Top-level relay engine that ties together all subsystems.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, Stream};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use mirror_core::config::RelayConfig;
use mirror_core::types::ConnectionId;

use crate::connection::registry::{ConnectionRegistry, RegistryEntry};
use crate::message::frame::{InboundFrame, OutboundFrame};
use crate::metrics::EngineMetrics;
use crate::relay::router::RelayRouter;
use crate::session::handler::{Session, SessionContext, SessionEnd, SessionReport};
use crate::session::supervisor::SessionSupervisor;

/// Central relay engine. Cloning is cheap; every clone shares the same
/// registry, supervisor and metrics.
#[derive(Clone)]
pub struct RelayEngine {
    /// Relay configuration.
    pub config: Arc<RelayConfig>,
    /// Connection registry.
    pub registry: Arc<ConnectionRegistry>,
    /// Relay router.
    pub router: Arc<RelayRouter>,
    /// Session supervisor.
    pub supervisor: SessionSupervisor,
    /// Metrics collector.
    pub metrics: Arc<EngineMetrics>,
}

impl fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayEngine")
            .field("registered", &self.registry.len())
            .field("sessions", &self.supervisor.active_count())
            .finish()
    }
}

impl RelayEngine {
    /// Creates a new relay engine with all subsystems.
    pub fn new(config: RelayConfig) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let registry = Arc::new(ConnectionRegistry::new());
        let router = Arc::new(RelayRouter::new(registry.clone(), metrics.clone()));

        info!(
            outbound_buffer = config.outbound_buffer_size,
            "Relay engine initialized"
        );

        Self {
            config: Arc::new(config),
            registry,
            router,
            supervisor: SessionSupervisor::new(),
            metrics,
        }
    }

    fn context(&self) -> SessionContext {
        SessionContext {
            registry: self.registry.clone(),
            router: self.router.clone(),
            metrics: self.metrics.clone(),
            supervisor: self.supervisor.clone(),
            outbound_buffer_size: self.config.outbound_buffer_size,
        }
    }

    /// Starts a session for a newly accepted connection.
    pub fn accept<I, O, E>(&self, inbound: I, outbound: O) -> JoinHandle<SessionReport>
    where
        I: Stream<Item = Result<InboundFrame, E>> + Unpin + Send + 'static,
        O: Sink<OutboundFrame> + Unpin + Send + 'static,
        O::Error: fmt::Display + Send,
        E: fmt::Display + Send + 'static,
    {
        let id = ConnectionId::new();
        debug!(conn_id = %id, "Connection accepted");

        let session = Session::new(id, self.context());
        self.supervisor.spawn(id, async move {
            let report = session.run(inbound, outbound).await;
            match &report.end {
                SessionEnd::IdentificationFailed(err) => {
                    debug!(conn_id = %report.id, error = %err, "Session ended before relaying")
                }
                SessionEnd::TransportError(err) => {
                    debug!(conn_id = %report.id, error = %err, "Session ended on transport error")
                }
                SessionEnd::PeerClosed | SessionEnd::Shutdown => {
                    debug!(conn_id = %report.id, end = ?report.end, "Session ended")
                }
            }
            report
        })
    }

    /// Registry entries whose owning session is no longer running.
    ///
    /// Always empty unless a session failed to clean up after itself.
    pub fn orphaned_entries(&self) -> Vec<RegistryEntry> {
        self.registry
            .entries()
            .into_iter()
            .filter(|entry| !self.supervisor.is_active(entry.connection_id))
            .collect()
    }

    /// Closes every session, waiting up to `grace` for them to finish.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        info!("Shutting down relay engine");

        let clean = self.supervisor.shutdown(grace).await;

        let orphaned = self.orphaned_entries();
        if !orphaned.is_empty() {
            warn!(count = orphaned.len(), "Registry entries left after shutdown");
        }

        info!("Relay engine shut down");
        clean
    }
}
