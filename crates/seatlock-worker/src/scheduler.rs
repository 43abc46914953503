//! Scheduler that runs the expiry sweep on a fixed period.

use std::sync::Arc;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing;

use seatlock_core::error::AppError;

use crate::sweeper::ExpirySweeper;

/// Repeating-job scheduler owning the sweep task.
pub struct SweepScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for SweepScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SweepScheduler").finish()
    }
}

impl SweepScheduler {
    /// Create a new, stopped scheduler
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Register `sweeper` to run every [`ExpirySweeper::interval`]
    pub async fn register_sweeper(&self, sweeper: Arc<ExpirySweeper>) -> Result<(), AppError> {
        let interval = sweeper.interval();
        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let sweeper = Arc::clone(&sweeper);
            Box::pin(async move {
                if let Some(Err(e)) = sweeper.tick().await {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            })
        })
        .map_err(|e| AppError::internal(format!("Failed to create expiry_sweep schedule: {e}")))?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add expiry_sweep schedule: {e}")))?;

        tracing::info!(
            interval_secs = interval.as_secs(),
            "Registered: expiry_sweep"
        );
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Sweep scheduler started");
        Ok(())
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Sweep scheduler shut down");
        Ok(())
    }
}
