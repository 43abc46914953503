//! Room registry: manages all showtime rooms and their members.

use dashmap::DashMap;

use seatlock_core::types::ShowtimeId;

use crate::connection::handle::ConnectionId;

use super::room::Room;
use super::subscription::SubscriptionTracker;

/// Registry of all showtime rooms that currently have members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    /// Showtime ID → room.
    rooms: DashMap<ShowtimeId, Room>,
    /// Reverse index.
    subscriptions: SubscriptionTracker,
}

impl RoomRegistry {
    /// Creates a new room registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to a showtime's room. Returns `false` if it was
    /// already a member.
    pub fn join(&self, showtime_id: &ShowtimeId, conn_id: ConnectionId) -> bool {
        let added = self
            .rooms
            .entry(showtime_id.clone())
            .or_insert_with(|| Room::new(showtime_id.clone()))
            .join(conn_id);

        self.subscriptions.add(conn_id, showtime_id.clone());
        added
    }

    /// Removes a connection from a room. Idempotent.
    pub fn leave(&self, showtime_id: &ShowtimeId, conn_id: ConnectionId) -> bool {
        let removed = self.leave_room(showtime_id, conn_id);
        self.subscriptions.remove(conn_id, showtime_id);
        removed
    }

    /// Removes a connection from every room it joined.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<ShowtimeId> {
        let rooms = self.subscriptions.remove_all(conn_id);
        for showtime_id in &rooms {
            self.leave_room(showtime_id, conn_id);
        }
        rooms.into_iter().collect()
    }

    fn leave_room(&self, showtime_id: &ShowtimeId, conn_id: ConnectionId) -> bool {
        let mut removed = false;
        self.rooms.remove_if_mut(showtime_id, |_, room| {
            removed = room.leave(conn_id);
            room.is_empty()
        });
        removed
    }

    /// Whether `conn_id` is a member of the showtime's room.
    pub fn is_member(&self, showtime_id: &ShowtimeId, conn_id: ConnectionId) -> bool {
        self.rooms
            .get(showtime_id)
            .is_some_and(|room| room.contains(conn_id))
    }

    /// Point-in-time copy of a room's members.
    pub fn members(&self, showtime_id: &ShowtimeId) -> Vec<ConnectionId> {
        self.rooms
            .get(showtime_id)
            .map(|room| room.members())
            .unwrap_or_default()
    }

    /// Rooms a connection has joined.
    pub fn rooms_of(&self, conn_id: ConnectionId) -> Vec<ShowtimeId> {
        self.subscriptions.rooms_of(conn_id).into_iter().collect()
    }

    /// Returns member count for a room.
    pub fn member_count(&self, showtime_id: &ShowtimeId) -> usize {
        self.rooms
            .get(showtime_id)
            .map(|room| room.member_count())
            .unwrap_or(0)
    }

    /// Returns number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
