//! Reverse index: which rooms each connection has joined.

use std::collections::HashSet;

use dashmap::DashMap;

use seatlock_core::types::ShowtimeId;

use crate::connection::handle::ConnectionId;

/// Tracks connection-to-room memberships.
#[derive(Debug, Default)]
pub struct SubscriptionTracker {
    /// Connection ID → joined showtimes.
    conn_to_rooms: DashMap<ConnectionId, HashSet<ShowtimeId>>,
}

impl SubscriptionTracker {
    /// Creates a new subscription tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a membership.
    pub fn add(&self, conn_id: ConnectionId, showtime_id: ShowtimeId) {
        self.conn_to_rooms
            .entry(conn_id)
            .or_default()
            .insert(showtime_id);
    }

    /// Removes a membership.
    pub fn remove(&self, conn_id: ConnectionId, showtime_id: &ShowtimeId) {
        self.conn_to_rooms
            .remove_if_mut(&conn_id, |_, rooms| {
                rooms.remove(showtime_id);
                rooms.is_empty()
            });
    }

    /// Whether `conn_id` has joined `showtime_id`.
    pub fn contains(&self, conn_id: ConnectionId, showtime_id: &ShowtimeId) -> bool {
        self.conn_to_rooms
            .get(&conn_id)
            .is_some_and(|rooms| rooms.contains(showtime_id))
    }

    /// Gets all rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> HashSet<ShowtimeId> {
        self.conn_to_rooms
            .get(&conn_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Removes all memberships for a connection.
    pub fn remove_all(&self, conn_id: ConnectionId) -> HashSet<ShowtimeId> {
        self.conn_to_rooms
            .remove(&conn_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default()
    }
}
