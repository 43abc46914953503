//! Single showtime room with member tracking.

use std::collections::HashSet;

use seatlock_core::types::ShowtimeId;

use crate::connection::handle::ConnectionId;

/// The broadcast group of one showtime.
#[derive(Debug, Clone)]
pub struct Room {
    /// Showtime this room belongs to.
    pub showtime_id: ShowtimeId,
    /// Member connection IDs.
    members: HashSet<ConnectionId>,
}

impl Room {
    /// Creates a new empty room.
    pub fn new(showtime_id: ShowtimeId) -> Self {
        Self {
            showtime_id,
            members: HashSet::new(),
        }
    }

    /// Adds a member. Returns `false` if it was already present.
    pub fn join(&mut self, conn_id: ConnectionId) -> bool {
        self.members.insert(conn_id)
    }

    /// Removes a member. Returns `false` if it was not present.
    pub fn leave(&mut self, conn_id: ConnectionId) -> bool {
        self.members.remove(&conn_id)
    }

    /// Whether `conn_id` is a member.
    pub fn contains(&self, conn_id: ConnectionId) -> bool {
        self.members.contains(&conn_id)
    }

    /// Returns member count.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Returns whether the room has any members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns a copy of the member list.
    pub fn members(&self) -> Vec<ConnectionId> {
        self.members.iter().copied().collect()
    }
}
