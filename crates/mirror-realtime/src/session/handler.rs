//! Session handler: drives one connection from accept to close.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use mirror_core::types::{ClientId, ConnectionId, Mode};

use crate::connection::handle::ConnectionHandle;
use crate::connection::registry::ConnectionRegistry;
use crate::message::frame::{InboundFrame, OutboundFrame};
use crate::message::identification::Identification;
use crate::metrics::EngineMetrics;
use crate::relay::router::RelayRouter;

use super::error::ProtocolError;
use super::state::SessionState;
use super::supervisor::SessionSupervisor;

/// Upper bound on the close handshake with a client that stopped reading.
const CLOSE_TIMEOUT: Duration = Duration::from_millis(250);

/// Shared collaborators injected into every session.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub registry: Arc<ConnectionRegistry>,
    pub router: Arc<RelayRouter>,
    pub metrics: Arc<EngineMetrics>,
    pub supervisor: SessionSupervisor,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer_size: usize,
}

/// Why a session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The first message was missing or invalid. Nothing was registered.
    IdentificationFailed(ProtocolError),
    /// The client closed the connection.
    PeerClosed,
    /// The transport failed while relaying.
    TransportError(String),
    /// The supervisor asked every session to stop.
    Shutdown,
}

/// Outcome of a finished session.
#[derive(Debug)]
pub struct SessionReport {
    pub id: ConnectionId,
    /// Identity the session relayed under, if it got that far.
    pub identity: Option<Identification>,
    pub end: SessionEnd,
}

/// One client connection's lifecycle.
///
/// A session owns its transport exclusively. It only ever touches the
/// registry entry it created, and removes it only if that entry still
/// belongs to this connection.
pub struct Session {
    id: ConnectionId,
    ctx: SessionContext,
    shutdown: CancellationToken,
    state: SessionState,
}

impl Session {
    /// Creates a session in the `Connecting` state.
    pub fn new(id: ConnectionId, ctx: SessionContext) -> Self {
        let shutdown = ctx.supervisor.token();
        Self {
            id,
            ctx,
            shutdown,
            state: SessionState::Connecting,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the session to completion over the given transport halves.
    pub async fn run<I, O, E>(mut self, mut inbound: I, mut outbound: O) -> SessionReport
    where
        I: Stream<Item = Result<InboundFrame, E>> + Unpin,
        O: Sink<OutboundFrame> + Unpin,
        O::Error: fmt::Display,
        E: fmt::Display,
    {
        self.transition(SessionState::Identifying);

        let identity = match self.identify(&mut inbound).await {
            Ok(identity) => identity,
            Err(end) => {
                self.transition(SessionState::Closing);
                self.close(&mut outbound).await;
                return SessionReport {
                    id: self.id,
                    identity: None,
                    end,
                };
            }
        };

        let mode = identity.client_mode;
        let client_id = identity.client_id.clone();
        let tag = identity.tag();

        let (handle, mut outbox) = ConnectionHandle::new(
            self.id,
            mode,
            client_id.clone(),
            self.ctx.outbound_buffer_size,
        );
        let handle = Arc::new(handle);

        if let Some(replaced) = self
            .ctx
            .registry
            .register(mode, client_id.clone(), handle.clone())
        {
            warn!(
                conn_id = %self.id,
                replaced = %replaced.id,
                client = %tag,
                "Client {} re-registered, replacing previous connection",
                tag
            );
        }
        self.ctx
            .supervisor
            .set_identity(self.id, mode, client_id.clone());
        self.transition(SessionState::Relaying);
        self.ctx.metrics.record_connect();
        info!(conn_id = %self.id, client = %tag, "Client connected: {}", tag);

        let end = self
            .relay(mode, &client_id, &mut inbound, &mut outbound, &mut outbox)
            .await;

        self.transition(SessionState::Closing);
        self.ctx
            .registry
            .deregister(mode, client_id.as_str(), self.id);
        handle.mark_closed();
        self.ctx.metrics.record_disconnect();
        self.close(&mut outbound).await;

        info!(conn_id = %self.id, client = %tag, "Client disconnected: {}", tag);

        SessionReport {
            id: self.id,
            identity: Some(identity),
            end,
        }
    }

    /// Waits for the identification message.
    async fn identify<I, E>(&self, inbound: &mut I) -> Result<Identification, SessionEnd>
    where
        I: Stream<Item = Result<InboundFrame, E>> + Unpin,
        E: fmt::Display,
    {
        let frame = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Err(SessionEnd::Shutdown),
            frame = inbound.next() => frame,
        };

        let parsed = match frame {
            None | Some(Ok(InboundFrame::Close)) => Err(ProtocolError::Closed),
            Some(Err(err)) => Err(ProtocolError::Transport(err.to_string())),
            Some(Ok(frame)) => frame
                .into_text()
                .ok_or(ProtocolError::NotText)
                .and_then(|text| Identification::parse(&text)),
        };

        parsed.map_err(|err| {
            warn!(conn_id = %self.id, error = %err, "Identification failed, closing connection");
            self.ctx.metrics.record_identification_failure();
            SessionEnd::IdentificationFailed(err)
        })
    }

    /// Relay loop: forwards inbound messages and drains the outbound queue.
    async fn relay<I, O, E>(
        &self,
        mode: Mode,
        client_id: &ClientId,
        inbound: &mut I,
        outbound: &mut O,
        outbox: &mut mpsc::Receiver<String>,
    ) -> SessionEnd
    where
        I: Stream<Item = Result<InboundFrame, E>> + Unpin,
        O: Sink<OutboundFrame> + Unpin,
        O::Error: fmt::Display,
        E: fmt::Display,
    {
        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return SessionEnd::Shutdown,
                frame = inbound.next() => match frame {
                    None | Some(Ok(InboundFrame::Close)) => return SessionEnd::PeerClosed,
                    Some(Err(err)) => {
                        debug!(conn_id = %self.id, error = %err, "Transport error");
                        return SessionEnd::TransportError(err.to_string());
                    }
                    Some(Ok(frame)) => self.handle_frame(mode, client_id, frame),
                },
                Some(text) = outbox.recv() => {
                    // A client that stops reading stalls this write; shutdown must still win.
                    let written = tokio::select! {
                        biased;
                        _ = self.shutdown.cancelled() => return SessionEnd::Shutdown,
                        written = outbound.send(OutboundFrame::Text(text)) => written,
                    };
                    if let Err(err) = written {
                        debug!(conn_id = %self.id, error = %err, "Outbound write failed");
                        return SessionEnd::TransportError(err.to_string());
                    }
                }
            }
        }
    }

    /// Decodes one relay-phase frame and forwards it to the mirror peer.
    /// Undecodable frames are dropped and the session keeps relaying.
    fn handle_frame(&self, mode: Mode, client_id: &ClientId, frame: InboundFrame) {
        self.ctx.metrics.record_received();

        let Some(text) = frame.into_text() else {
            warn!(conn_id = %self.id, client = %client_id, mode = %mode, "Dropping non-UTF-8 frame");
            self.ctx.metrics.record_invalid();
            return;
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(message) => {
                let outcome = self.ctx.router.forward(mode, client_id, &message);
                trace!(conn_id = %self.id, ?outcome, "Message forwarded");
            }
            Err(err) => {
                warn!(
                    conn_id = %self.id,
                    client = %client_id,
                    mode = %mode,
                    error = %err,
                    "Dropping malformed JSON message"
                );
                self.ctx.metrics.record_invalid();
            }
        }
    }

    /// Best-effort close of the transport, bounded by [`CLOSE_TIMEOUT`].
    async fn close<O>(&mut self, outbound: &mut O)
    where
        O: Sink<OutboundFrame> + Unpin,
        O::Error: fmt::Display,
    {
        let id = self.id;
        let handshake = async {
            if let Err(err) = outbound.send(OutboundFrame::Close).await {
                trace!(conn_id = %id, error = %err, "Close frame not sent");
            }
            if let Err(err) = outbound.close().await {
                trace!(conn_id = %id, error = %err, "Transport close failed");
            }
        };
        if tokio::time::timeout(CLOSE_TIMEOUT, handshake).await.is_err() {
            debug!(conn_id = %id, "Client not reading, abandoning close handshake");
        }
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, next: SessionState) {
        if !self.state.can_transition_to(next) {
            debug!(conn_id = %self.id, from = %self.state, to = %next, "Ignoring invalid state transition");
            return;
        }
        trace!(conn_id = %self.id, from = %self.state, to = %next, "Session state change");
        self.state = next;
        self.ctx.supervisor.set_state(self.id, next);
    }
}
