//! # seatlock-realtime
//!
//! Real-time WebSocket engine for the seat-lock service. Provides:
//!
//! - Connection handles with bounded, non-blocking outboxes
//! - One room per showtime, with a reverse index for disconnect cleanup
//! - The room broadcaster (unicast, room multicast, release announcements)
//! - The per-connection session state machine driving the lock protocol
//! - Heartbeat keepalive and engine metrics

pub mod broadcast;
pub mod connection;
pub mod message;
pub mod metrics;
pub mod room;
pub mod server;
pub mod session;

pub use broadcast::RoomBroadcaster;
pub use connection::{ConnectionHandle, ConnectionId};
pub use message::{InboundMessage, OutboundMessage};
pub use metrics::RealtimeMetrics;
pub use room::RoomRegistry;
pub use server::RealtimeEngine;
pub use session::{SessionAdapter, SessionEvent};
