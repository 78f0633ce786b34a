//! Session supervisor: spawns, tracks and stops session tasks.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use mirror_core::types::{ClientId, ConnectionId, Mode};

use super::state::SessionState;

/// Point-in-time view of one live session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Connection the session owns
    pub id: ConnectionId,
    /// Current lifecycle state
    pub state: SessionState,
    /// Side of the link, once identified
    pub mode: Option<Mode>,
    /// Client id, once identified
    pub client_id: Option<ClientId>,
    /// When the connection was accepted
    pub started_at: DateTime<Utc>,
}

impl SessionSnapshot {
    fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: SessionState::Connecting,
            mode: None,
            client_id: None,
            started_at: Utc::now(),
        }
    }
}

/// Owns every session task.
///
/// Sessions are spawned on a [`TaskTracker`] and observe a shared
/// [`CancellationToken`]. A session is listed in the live table from spawn
/// until its task finishes, whether it returns or panics.
#[derive(Debug, Clone, Default)]
pub struct SessionSupervisor {
    tracker: TaskTracker,
    shutdown: CancellationToken,
    sessions: Arc<DashMap<ConnectionId, SessionSnapshot>>,
}

/// Removes a session from the live table when its task ends.
struct SessionGuard {
    id: ConnectionId,
    sessions: Arc<DashMap<ConnectionId, SessionSnapshot>>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.sessions.remove(&self.id);
    }
}

impl SessionSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns the task for session `id` and lists it as `Connecting`.
    pub fn spawn<F>(&self, id: ConnectionId, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.sessions.insert(id, SessionSnapshot::new(id));
        let guard = SessionGuard {
            id,
            sessions: self.sessions.clone(),
        };
        self.tracker.spawn(async move {
            let _guard = guard;
            task.await
        })
    }

    /// Token a session watches for the shutdown signal.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Whether [`shutdown`](Self::shutdown) has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Records a state change for session `id`.
    pub fn set_state(&self, id: ConnectionId, state: SessionState) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.state = state;
        }
    }

    /// Records the identity a session registered under.
    pub fn set_identity(&self, id: ConnectionId, mode: Mode, client_id: ClientId) {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            session.mode = Some(mode);
            session.client_id = Some(client_id);
        }
    }

    /// Snapshot of every live session.
    pub fn active_sessions(&self) -> Vec<SessionSnapshot> {
        self.sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_active(&self, id: ConnectionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Signals every session to close and waits up to `grace` for them.
    ///
    /// Returns `true` if all sessions finished within the grace period.
    pub async fn shutdown(&self, grace: Duration) -> bool {
        let live = self.active_count();
        info!(sessions = live, "Shutting down sessions");

        self.tracker.close();
        self.shutdown.cancel();

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => {
                info!("All sessions closed");
                true
            }
            Err(_) => {
                warn!(
                    remaining = self.active_count(),
                    grace_secs = grace.as_secs_f64(),
                    "Sessions still running after grace period"
                );
                false
            }
        }
    }
}
