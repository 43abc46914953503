//! Room broadcaster: delivers events to the members of a showtime room.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use seatlock_core::traits::ReleaseAnnouncer;
use seatlock_core::types::{SeatLock, ShowtimeId};

use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::message::types::{OutboundMessage, SeatEvent};
use crate::metrics::RealtimeMetrics;
use crate::room::registry::RoomRegistry;

/// Routes messages to single connections or whole rooms.
///
/// Delivery is best-effort: every send is a non-blocking enqueue on the
/// recipient's outbox, and a failed enqueue affects only that recipient.
#[derive(Debug)]
pub struct RoomBroadcaster {
    pool: Arc<ConnectionPool>,
    rooms: Arc<RoomRegistry>,
    metrics: Arc<RealtimeMetrics>,
}

impl RoomBroadcaster {
    /// Creates a broadcaster over the given pool and rooms.
    pub fn new(
        pool: Arc<ConnectionPool>,
        rooms: Arc<RoomRegistry>,
        metrics: Arc<RealtimeMetrics>,
    ) -> Self {
        Self {
            pool,
            rooms,
            metrics,
        }
    }

    /// Connection pool.
    pub fn pool(&self) -> &Arc<ConnectionPool> {
        &self.pool
    }

    /// Room registry.
    pub fn rooms(&self) -> &Arc<RoomRegistry> {
        &self.rooms
    }

    /// Adds a connection to the pool.
    pub fn register(&self, handle: Arc<ConnectionHandle>) {
        self.pool.add(handle);
        self.metrics.connection_opened();
    }

    /// Removes a connection from every room and from the pool.
    pub fn unregister(&self, conn_id: ConnectionId) {
        self.rooms.leave_all(conn_id);
        if let Some(handle) = self.pool.remove(&conn_id) {
            handle.mark_dead();
            self.metrics.connection_closed();
        }
    }

    /// Adds a connection to a showtime's room.
    pub fn join(&self, conn_id: ConnectionId, showtime_id: &ShowtimeId) -> bool {
        self.rooms.join(showtime_id, conn_id)
    }

    /// Removes a connection from a showtime's room. Idempotent.
    pub fn leave(&self, conn_id: ConnectionId, showtime_id: &ShowtimeId) -> bool {
        self.rooms.leave(showtime_id, conn_id)
    }

    /// Removes a connection from every room.
    pub fn leave_all(&self, conn_id: ConnectionId) -> Vec<ShowtimeId> {
        self.rooms.leave_all(conn_id)
    }

    /// Whether a connection is in a showtime's room.
    pub fn is_member(&self, conn_id: ConnectionId, showtime_id: &ShowtimeId) -> bool {
        self.rooms.is_member(showtime_id, conn_id)
    }

    /// Sends a message to one connection.
    pub async fn send_to(&self, conn_id: ConnectionId, msg: OutboundMessage) -> bool {
        match self.pool.get(&conn_id) {
            Some(handle) => self.deliver(&handle, msg).await,
            None => false,
        }
    }

    /// Sends a message to every member of a room except `excluding`.
    ///
    /// Returns the number of members the message was queued for.
    pub async fn broadcast(
        &self,
        showtime_id: &ShowtimeId,
        msg: OutboundMessage,
        excluding: Option<ConnectionId>,
    ) -> usize {
        let members = self.rooms.members(showtime_id);
        let mut delivered = 0;

        for conn_id in members {
            if Some(conn_id) == excluding {
                continue;
            }
            let Some(handle) = self.pool.get(&conn_id) else {
                continue;
            };
            if self.deliver(&handle, msg.clone()).await {
                delivered += 1;
            }
        }

        debug!(showtime_id = %showtime_id, delivered, "Room broadcast");
        delivered
    }

    async fn deliver(&self, handle: &ConnectionHandle, msg: OutboundMessage) -> bool {
        let sent = handle.send(msg).await;
        if sent {
            self.metrics.message_sent();
        } else {
            self.metrics.message_dropped();
        }
        sent
    }
}

#[async_trait]
impl ReleaseAnnouncer for RoomBroadcaster {
    async fn announce_release(&self, lock: &SeatLock) -> usize {
        self.metrics.lock_expired();
        let event = SeatEvent::new(lock.showtime_id.clone(), lock.seat_label.clone());
        self.broadcast(&lock.showtime_id, OutboundMessage::SeatReleased(event), None)
            .await
    }
}
