//! Individual connection handle.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use mirror_core::types::{ClientId, ConnectionId, Mode};

/// A non-owning handle to one identified connection.
///
/// The owning session keeps the receiving end of the outbound queue and
/// writes whatever arrives to the socket. The registry and the router only
/// ever hold this handle, so they can enqueue messages but never close the
/// connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Side of the link
    pub mode: Mode,
    /// Client-supplied id
    pub client_id: ClientId,
    /// When the connection was identified
    pub connected_at: DateTime<Utc>,
    sender: mpsc::Sender<String>,
    alive: AtomicBool,
}

/// Why an outbound message could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The outbound queue is at capacity.
    #[error("outbound queue full")]
    Full,
    /// The owning session has stopped draining the queue.
    #[error("connection closed")]
    Closed,
}

impl ConnectionHandle {
    /// Create a handle and the receiver its session drains.
    pub fn new(
        id: ConnectionId,
        mode: Mode,
        client_id: ClientId,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let handle = Self {
            id,
            mode,
            client_id,
            connected_at: Utc::now(),
            sender,
            alive: AtomicBool::new(true),
        };
        (handle, receiver)
    }

    /// Queue a serialized message for delivery. Never waits.
    pub fn send(&self, text: String) -> Result<(), DeliveryError> {
        if !self.is_alive() {
            return Err(DeliveryError::Closed);
        }
        match self.sender.try_send(text) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(
                    conn_id = %self.id,
                    client = %self.tag(),
                    "Outbound buffer full, dropping message"
                );
                Err(DeliveryError::Full)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_closed();
                Err(DeliveryError::Closed)
            }
        }
    }

    /// Check if connection is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as closed; later sends fail fast.
    pub fn mark_closed(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// `id[mode]` tag for logs.
    pub fn tag(&self) -> String {
        format!("{}[{}]", self.client_id, self.mode)
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            mode: self.mode,
            client_id: self.client_id.clone(),
            connected_at: self.connected_at,
            alive: self.is_alive(),
        }
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Side of the link
    pub mode: Mode,
    /// Client-supplied id
    pub client_id: ClientId,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Is alive
    pub alive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(buffer: usize) -> (ConnectionHandle, mpsc::Receiver<String>) {
        ConnectionHandle::new(ConnectionId::new(), Mode::Web, ClientId::from("abc"), buffer)
    }

    #[tokio::test]
    async fn test_send_queues_in_order() {
        let (handle, mut rx) = handle(4);
        handle.send("one".into()).unwrap();
        handle.send("two".into()).unwrap();
        assert_eq!(rx.recv().await.as_deref(), Some("one"));
        assert_eq!(rx.recv().await.as_deref(), Some("two"));
    }

    #[test]
    fn test_full_buffer_drops() {
        let (handle, _rx) = handle(1);
        handle.send("first".into()).unwrap();
        assert_eq!(handle.send("second".into()), Err(DeliveryError::Full));
        assert!(handle.is_alive());
    }

    #[test]
    fn test_dropped_receiver_marks_closed() {
        let (handle, rx) = handle(4);
        drop(rx);
        assert_eq!(handle.send("lost".into()), Err(DeliveryError::Closed));
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_mark_closed_rejects_sends() {
        let (handle, _rx) = handle(4);
        handle.mark_closed();
        assert_eq!(handle.send("late".into()), Err(DeliveryError::Closed));
        assert!(!handle.info().alive);
        assert_eq!(handle.tag(), "abc[web]");
    }
}
