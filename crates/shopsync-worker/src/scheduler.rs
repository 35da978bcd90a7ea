//! Cron scheduler running sweeps independently of sync requests.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing;

use shopsync_core::error::AppError;

use crate::runner::JobRunner;

/// Cron-based trigger for [`JobRunner::execute`].
pub struct CronScheduler {
    scheduler: JobScheduler,
    runner: Arc<JobRunner>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    pub async fn new(runner: Arc<JobRunner>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler, runner })
    }

    /// Run a sweep on every tick of `expression` (six-field cron syntax).
    /// Sweep failures are logged; the job stays pending for the next tick.
    pub async fn register_sweep(&self, expression: &str) -> Result<(), AppError> {
        let runner = Arc::clone(&self.runner);
        let job = CronJob::new_async(expression, move |_uuid, _lock| {
            let runner = Arc::clone(&runner);
            Box::pin(async move {
                tracing::debug!("Scheduled job sweep starting");
                if let Err(e) = runner.execute().await {
                    tracing::error!(error = %e, "Scheduled job sweep failed");
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid job schedule '{expression}': {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add sweep schedule: {e}")))?;

        tracing::info!(schedule = %expression, "Registered scheduled job sweep");
        Ok(())
    }

    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
