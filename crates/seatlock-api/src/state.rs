//! Application state shared across all handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use seatlock_core::config::AppConfig;
use seatlock_realtime::RealtimeEngine;

/// Application state passed to every handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// WebSocket realtime engine
    pub engine: RealtimeEngine,
    /// Process start time, for uptime reporting
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Creates the state with `started_at` set to now.
    pub fn new(config: Arc<AppConfig>, engine: RealtimeEngine) -> Self {
        Self {
            config,
            engine,
            started_at: Utc::now(),
        }
    }

    /// Seconds since start.
    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}
