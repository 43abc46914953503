//! Realtime engine metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Engine-level metrics counters.
#[derive(Debug, Default)]
pub struct RealtimeMetrics {
    connections_opened: AtomicU64,
    connections_active: AtomicU64,
    messages_received: AtomicU64,
    messages_sent: AtomicU64,
    messages_dropped: AtomicU64,
    locks_granted: AtomicU64,
    locks_conflicted: AtomicU64,
    locks_released: AtomicU64,
    locks_expired: AtomicU64,
}

impl RealtimeMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection
    pub fn connection_opened(&self) {
        self.connections_opened.fetch_add(1, Ordering::Relaxed);
        self.connections_active.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a disconnection
    pub fn connection_closed(&self) {
        self.connections_active.fetch_sub(1, Ordering::Relaxed);
    }

    /// Record an inbound frame
    pub fn message_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound message queued for a connection
    pub fn message_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an outbound message dropped for a connection
    pub fn message_dropped(&self) {
        self.messages_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a granted acquire
    pub fn lock_granted(&self) {
        self.locks_granted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an acquire conflict
    pub fn lock_conflicted(&self) {
        self.locks_conflicted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an explicit release
    pub fn lock_released(&self) {
        self.locks_released.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a lock reclaimed by the sweeper
    pub fn lock_expired(&self) {
        self.locks_expired.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_opened: self.connections_opened.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_dropped: self.messages_dropped.load(Ordering::Relaxed),
            locks_granted: self.locks_granted.load(Ordering::Relaxed),
            locks_conflicted: self.locks_conflicted.load(Ordering::Relaxed),
            locks_released: self.locks_released.load(Ordering::Relaxed),
            locks_expired: self.locks_expired.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever opened
    pub connections_opened: u64,
    /// Currently open connections
    pub connections_active: u64,
    /// Inbound frames
    pub messages_received: u64,
    /// Outbound messages queued
    pub messages_sent: u64,
    /// Outbound messages dropped (full or closed outbox)
    pub messages_dropped: u64,
    /// Successful acquires
    pub locks_granted: u64,
    /// Acquires refused by a live lock
    pub locks_conflicted: u64,
    /// Explicit releases
    pub locks_released: u64,
    /// Locks reclaimed by the sweeper
    pub locks_expired: u64,
}
