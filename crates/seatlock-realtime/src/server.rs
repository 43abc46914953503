//! Top-level real-time engine that ties together all subsystems.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;

use seatlock_core::config::RealtimeConfig;
use seatlock_core::error::AppError;
use seatlock_core::traits::{Clock, ReleaseAnnouncer};
use seatlock_core::types::HolderId;
use seatlock_locks::LockCoordinator;

use crate::broadcast::RoomBroadcaster;
use crate::connection::handle::ConnectionHandle;
use crate::connection::heartbeat::HeartbeatConfig;
use crate::connection::pool::ConnectionPool;
use crate::message::types::OutboundMessage;
use crate::metrics::RealtimeMetrics;
use crate::room::registry::RoomRegistry;
use crate::session::adapter::SessionAdapter;

/// Central real-time engine shared by every connection.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Lock protocol.
    pub coordinator: Arc<LockCoordinator>,
    /// Room broadcaster.
    pub broadcaster: Arc<RoomBroadcaster>,
    /// Metrics collector.
    pub metrics: Arc<RealtimeMetrics>,
    /// Wall clock used for lock timestamps.
    clock: Arc<dyn Clock>,
    /// Engine configuration.
    config: RealtimeConfig,
    /// Release a session's locks when its connection drops.
    release_on_disconnect: bool,
    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine")
            .field("release_on_disconnect", &self.release_on_disconnect)
            .finish()
    }
}

impl RealtimeEngine {
    /// Creates a new real-time engine.
    pub fn new(
        coordinator: Arc<LockCoordinator>,
        clock: Arc<dyn Clock>,
        config: RealtimeConfig,
        release_on_disconnect: bool,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let metrics = Arc::new(RealtimeMetrics::new());
        let broadcaster = Arc::new(RoomBroadcaster::new(
            Arc::new(ConnectionPool::new()),
            Arc::new(RoomRegistry::new()),
            metrics.clone(),
        ));

        info!(
            buffer = config.channel_buffer_size,
            release_on_disconnect, "Real-time engine initialized"
        );

        Self {
            coordinator,
            broadcaster,
            metrics,
            clock,
            config,
            release_on_disconnect,
            shutdown_tx,
        }
    }

    /// Registers a new connection and returns its session together with
    /// the receiver side of the connection's outbox.
    pub fn open_session(
        &self,
        holder: Option<HolderId>,
    ) -> (SessionAdapter, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(tx));
        self.broadcaster.register(handle.clone());

        info!(
            conn_id = %handle.id,
            holder_id = ?holder.as_ref().map(HolderId::as_str),
            "WebSocket connection registered"
        );

        (SessionAdapter::new(self.clone(), handle, holder), rx)
    }

    /// Wall clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Whether sessions release their locks at disconnect.
    pub fn release_on_disconnect(&self) -> bool {
        self.release_on_disconnect
    }

    /// Keepalive settings for connections.
    pub fn heartbeat_config(&self) -> HeartbeatConfig {
        HeartbeatConfig::from(&self.config)
    }

    /// The broadcaster as the sweeper's release announcer.
    pub fn announcer(&self) -> Arc<dyn ReleaseAnnouncer> {
        self.broadcaster.clone()
    }

    /// Number of open connections.
    pub fn connection_count(&self) -> usize {
        self.broadcaster.pool().connection_count()
    }

    /// Number of rooms with members.
    pub fn room_count(&self) -> usize {
        self.broadcaster.rooms().room_count()
    }

    /// Returns a shutdown receiver for graceful shutdown coordination.
    pub fn shutdown_receiver(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiates a graceful shutdown of the real-time engine.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        info!("Shutting down real-time engine");

        // Signal connection tasks to stop
        let _ = self.shutdown_tx.send(());

        for handle in self.broadcaster.pool().all_connections() {
            handle.mark_dead();
        }

        info!("Real-time engine shut down");
        Ok(())
    }
}
