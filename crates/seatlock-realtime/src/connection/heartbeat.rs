//! Ping-based keepalive for WebSocket connections.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;

use seatlock_core::config::RealtimeConfig;

use super::handle::ConnectionHandle;
use crate::message::types::OutboundMessage;

/// Heartbeat configuration
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between pings
    pub ping_interval: Duration,
    /// Extra grace after a missed interval before the connection is dead
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Maximum time a connection may stay silent.
    pub fn idle_limit(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

impl From<&RealtimeConfig> for HeartbeatConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: Duration::from_secs(config.ping_interval_seconds),
            ping_timeout: Duration::from_secs(config.ping_timeout_seconds),
        }
    }
}

/// Run heartbeat loop for a connection.
///
/// Queues a ping every interval. Returns once the connection is dead or
/// has been silent for longer than [`HeartbeatConfig::idle_limit`]; in the
/// latter case the connection is marked dead first.
pub async fn run_heartbeat(handle: Arc<ConnectionHandle>, config: HeartbeatConfig) {
    let mut interval = time::interval(config.ping_interval);
    // The first tick completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;

        if !handle.is_alive() {
            break;
        }

        let idle = Utc::now() - handle.last_activity().await;
        if let Ok(idle) = idle.to_std() {
            if idle > config.idle_limit() {
                tracing::warn!(
                    conn_id = %handle.id,
                    idle_ms = millis(idle),
                    "Heartbeat timeout"
                );
                handle.mark_dead();
                break;
            }
        }

        let ping = OutboundMessage::Ping {
            timestamp: Utc::now().timestamp_millis(),
        };
        if !handle.send(ping).await && !handle.is_alive() {
            break;
        }
    }

    tracing::debug!(conn_id = %handle.id, "Heartbeat loop ended");
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    #[tokio::test]
    async fn test_silent_connection_is_marked_dead() {
        let (tx, mut rx) = mpsc::channel(16);
        let handle = Arc::new(ConnectionHandle::new(tx));
        let config = HeartbeatConfig {
            ping_interval: Duration::from_millis(20),
            ping_timeout: Duration::from_millis(10),
        };

        tokio::time::timeout(Duration::from_secs(5), run_heartbeat(handle.clone(), config))
            .await
            .expect("heartbeat should end");

        assert!(!handle.is_alive());
        assert!(matches!(rx.recv().await, Some(OutboundMessage::Ping { .. })));
    }

    #[test]
    fn test_idle_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
