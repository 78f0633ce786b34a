//! Relay engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct EngineMetrics {
    /// Total connections that completed identification
    pub connections_total: AtomicU64,
    /// Identified connections currently relaying
    pub connections_active: AtomicU64,
    /// Sessions closed because of a bad identification message
    pub identification_failures: AtomicU64,
    /// Messages received from clients after identification
    pub messages_received: AtomicU64,
    /// Messages queued to a mirror peer
    pub messages_relayed: AtomicU64,
    /// Messages dropped because no mirror peer was connected
    pub messages_peer_absent: AtomicU64,
    /// Messages dropped because the mirror peer could not accept them
    pub messages_peer_unavailable: AtomicU64,
    /// Messages dropped because they were not valid JSON
    pub messages_invalid: AtomicU64,
}

impl EngineMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a connection entering the relay loop
    pub fn record_connect(&self) {
        self.connections_total.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a relaying connection closing
    pub fn record_disconnect(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn record_identification_failure(&self) {
        self.identification_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_relayed(&self) {
        self.messages_relayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_absent(&self) {
        self.messages_peer_absent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_peer_unavailable(&self) {
        self.messages_peer_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.messages_invalid.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            identification_failures: self.identification_failures.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_relayed: self.messages_relayed.load(Ordering::Relaxed),
            messages_peer_absent: self.messages_peer_absent.load(Ordering::Relaxed),
            messages_peer_unavailable: self.messages_peer_unavailable.load(Ordering::Relaxed),
            messages_invalid: self.messages_invalid.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub connections_total: u64,
    pub connections_active: u64,
    pub identification_failures: u64,
    pub messages_received: u64,
    pub messages_relayed: u64,
    pub messages_peer_absent: u64,
    pub messages_peer_unavailable: u64,
    pub messages_invalid: u64,
}
