//! Built-in garbage collection of gateway state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use shopsync_database::store::JobLedger;
use shopsync_entity::job::{JobKind, JobRecord};
use shopsync_transfer::scratch;

use super::RecurringAction;
use crate::executor::JobExecutionError;

/// Scratch entries older than this are stale regardless of the sweep grace.
const STALE_SCRATCH: Duration = Duration::from_secs(24 * 3600);

/// Prunes job history and stale scratch entries.
#[derive(Debug, Clone)]
pub struct GarbageCollector {
    ledger: Arc<dyn JobLedger>,
    scratch_root: PathBuf,
    retain_sync_files: bool,
    history_retention_days: i64,
    enabled: bool,
}

impl GarbageCollector {
    pub fn new(
        ledger: Arc<dyn JobLedger>,
        scratch_root: PathBuf,
        retain_sync_files: bool,
        history_retention_days: i64,
        enabled: bool,
    ) -> Self {
        Self {
            ledger,
            scratch_root,
            retain_sync_files,
            history_retention_days,
            enabled,
        }
    }
}

#[async_trait]
impl RecurringAction for GarbageCollector {
    fn kind(&self) -> JobKind {
        JobKind::GarbageCollector
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn run(&self, _job: &JobRecord) -> Result<Option<String>, JobExecutionError> {
        let cutoff = Utc::now() - chrono::Duration::days(self.history_retention_days);
        let pruned = self.ledger.prune_history(cutoff).await?;

        let stale = if self.retain_sync_files {
            0
        } else {
            scratch::purge(&self.scratch_root, STALE_SCRATCH)
                .await
                .map_err(|e| JobExecutionError::Failed(format!("scratch purge failed: {e}")))?
                .removed
        };

        info!(history_pruned = pruned, scratch_removed = stale, "Garbage collection finished");
        Ok(Some(format!(
            "pruned {pruned} history entries, removed {stale} scratch entries"
        )))
    }
}
