//! Connection registry: maps `(mode, client_id)` to the live connection.

use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use mirror_core::types::{ClientId, ConnectionId, Mode};

use super::handle::ConnectionHandle;

/// Thread-safe registry of identified connections, one table per mode.
///
/// Each key maps to at most one connection; registering an occupied key
/// replaces the previous entry. Every mutation holds the shard lock for its
/// key, so a concurrent lookup sees either the old or the new entry.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    web: DashMap<ClientId, Arc<ConnectionHandle>>,
    desktop: DashMap<ClientId, Arc<ConnectionHandle>>,
}

/// One registry entry, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Side of the link.
    pub mode: Mode,
    /// Client-supplied id.
    pub client_id: ClientId,
    /// Connection currently holding the key.
    pub connection_id: ConnectionId,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, mode: Mode) -> &DashMap<ClientId, Arc<ConnectionHandle>> {
        match mode {
            Mode::Web => &self.web,
            Mode::Desktop => &self.desktop,
        }
    }

    /// Maps `(mode, id)` to `conn`, returning the handle it replaced.
    pub fn register(
        &self,
        mode: Mode,
        id: ClientId,
        conn: Arc<ConnectionHandle>,
    ) -> Option<Arc<ConnectionHandle>> {
        self.table(mode).insert(id, conn)
    }

    /// Resolves `(mode, id)` to its connection. `None` means the client is
    /// not connected, which is routine.
    pub fn lookup(&self, mode: Mode, id: &str) -> Option<Arc<ConnectionHandle>> {
        self.table(mode).get(id).map(|entry| entry.value().clone())
    }

    /// Removes `(mode, id)` if it is still held by `conn_id`.
    ///
    /// Absent keys and keys taken over by another connection are left
    /// untouched. Returns whether an entry was removed.
    pub fn deregister(&self, mode: Mode, id: &str, conn_id: ConnectionId) -> bool {
        self.table(mode)
            .remove_if(id, |_, handle| handle.id == conn_id)
            .is_some()
    }

    /// Whether `(mode, id)` currently has a connection.
    pub fn contains(&self, mode: Mode, id: &str) -> bool {
        self.table(mode).contains_key(id)
    }

    /// Number of registered connections for one mode.
    pub fn count(&self, mode: Mode) -> usize {
        self.table(mode).len()
    }

    /// Total registered connections across both modes.
    pub fn len(&self) -> usize {
        self.web.len() + self.desktop.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.web.is_empty() && self.desktop.is_empty()
    }

    /// Lists every entry.
    pub fn entries(&self) -> Vec<RegistryEntry> {
        Mode::ALL
            .into_iter()
            .flat_map(|mode| {
                self.table(mode).iter().map(move |entry| RegistryEntry {
                    mode,
                    client_id: entry.key().clone(),
                    connection_id: entry.value().id,
                })
            })
            .collect()
    }
}
