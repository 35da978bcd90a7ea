//! The maintenance sweep.
//!
//! A sweep is started by a `LastJobs` sync request or by the cron
//! scheduler. It performs the storefront maintenance passes, runs the
//! one-shot rows finished by the previous sweep and every due recurring
//! row. Nothing here is locked: two overlapping sweeps can both run the
//! same recurring action, so actions have to be idempotent.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use shopsync_core::config::gateway::GatewayConfig;
use shopsync_core::config::jobs::JobsConfig;
use shopsync_core::config::storage::StorageConfig;
use shopsync_core::result::AppResult;
use shopsync_database::store::{JobLedger, ShopMaintenance};
use shopsync_entity::job::JobRecord;
use shopsync_transfer::scratch;

use crate::actions::RecurringAction;
use crate::executor::{JobExecutor, JobHandler};
use crate::hooks::DueJobHook;

/// Sweep parameters taken from configuration.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    pub scratch_root: PathBuf,
    pub retain_sync_files: bool,
    pub scratch_grace: Duration,
    pub due_interval: chrono::Duration,
}

impl SweepSettings {
    pub fn from_config(storage: &StorageConfig, gateway: &GatewayConfig, jobs: &JobsConfig) -> Self {
        Self {
            scratch_root: storage.sync_temp_path(),
            retain_sync_files: gateway.retain_sync_files,
            scratch_grace: Duration::from_secs(jobs.scratch_grace_minutes * 60),
            due_interval: chrono::Duration::hours(jobs.due_interval_hours),
        }
    }
}

/// What a sweep did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scratch_removed: u64,
    pub manufacturers_changed: u64,
    pub one_shots_marked: u64,
    pub one_shots_run: u64,
    pub one_shots_dropped: u64,
    pub recurring_run: u64,
    pub recurring_skipped: u64,
}

/// Runs sweeps over the job ledger.
#[derive(Debug)]
pub struct JobRunner {
    ledger: Arc<dyn JobLedger>,
    shop: Arc<dyn ShopMaintenance>,
    one_shots: JobExecutor,
    actions: HashMap<i32, Arc<dyn RecurringAction>>,
    hooks: Vec<Arc<dyn DueJobHook>>,
    settings: SweepSettings,
}

impl JobRunner {
    pub fn new(
        ledger: Arc<dyn JobLedger>,
        shop: Arc<dyn ShopMaintenance>,
        settings: SweepSettings,
    ) -> Self {
        Self {
            ledger,
            shop,
            one_shots: JobExecutor::new(),
            actions: HashMap::new(),
            hooks: Vec::new(),
            settings,
        }
    }

    pub fn register_one_shot(&mut self, handler: Arc<dyn JobHandler>) {
        self.one_shots.register(handler);
    }

    pub fn register_action(&mut self, action: Arc<dyn RecurringAction>) {
        info!(kind = %action.kind(), enabled = action.enabled(), "Registered recurring action");
        self.actions.insert(action.kind().code(), action);
    }

    pub fn register_hook(&mut self, hook: Arc<dyn DueJobHook>) {
        self.hooks.push(hook);
    }

    pub fn ledger(&self) -> &Arc<dyn JobLedger> {
        &self.ledger
    }

    /// Whether the recurring action for a kind exists and is enabled.
    pub fn is_enabled(&self, job_kind: i32) -> bool {
        self.actions.get(&job_kind).is_some_and(|a| a.enabled())
    }

    pub fn due_interval(&self) -> chrono::Duration {
        self.settings.due_interval
    }

    /// Run one sweep. The first failing job aborts the sweep and its
    /// error is returned; the job stays pending for the next sweep.
    pub async fn execute(&self) -> AppResult<SweepReport> {
        let mut report = SweepReport::default();

        self.shop.touch_last_changed().await?;

        if !self.settings.retain_sync_files {
            report.scratch_removed =
                scratch::purge(&self.settings.scratch_root, self.settings.scratch_grace)
                    .await?
                    .removed;
        }

        report.manufacturers_changed = self.shop.refresh_manufacturer_flags().await?;

        self.finish_one_shots(&mut report).await?;
        self.run_due_recurring(&mut report).await?;

        info!(
            one_shots = report.one_shots_run,
            recurring = report.recurring_run,
            skipped = report.recurring_skipped,
            "Job sweep finished"
        );
        Ok(report)
    }

    /// Rows marked finished by the previous sweep are run now; rows
    /// registered since then are only marked.
    async fn finish_one_shots(&self, report: &mut SweepReport) -> AppResult<()> {
        let ready = self.ledger.finished_one_shots().await?;
        report.one_shots_marked = self.ledger.mark_one_shots_finished().await?;

        for job in ready {
            match self.one_shots.get(&job.name) {
                Some(handler) => {
                    info!(id = job.id, name = %job.name, "Running one-shot job");
                    let result = handler.execute(&job).await?;
                    let summary = result.as_ref().map(Value::to_string);
                    self.ledger.record_history(&job, summary.as_deref()).await?;
                    report.one_shots_run += 1;
                }
                None => {
                    warn!(id = job.id, name = %job.name, "No handler for one-shot job, dropping it");
                    report.one_shots_dropped += 1;
                }
            }
            self.ledger.delete(&[job.id]).await?;
        }
        Ok(())
    }

    async fn run_due_recurring(&self, report: &mut SweepReport) -> AppResult<()> {
        let mut due = self.ledger.due_recurring(self.settings.due_interval).await?;
        for hook in &self.hooks {
            hook.extend(self.ledger.as_ref(), &mut due).await?;
        }
        let mut seen = HashSet::new();
        due.retain(|job| seen.insert(job.id));

        for job in due {
            self.ledger.bump_counter(job.id).await?;
            self.run_recurring(&job, report).await?;
        }
        Ok(())
    }

    async fn run_recurring(&self, job: &JobRecord, report: &mut SweepReport) -> AppResult<()> {
        let Some(action) = self.actions.get(&job.job_kind) else {
            warn!(id = job.id, kind = job.job_kind, "No action for recurring job kind");
            report.recurring_skipped += 1;
            return Ok(());
        };
        if !action.enabled() {
            debug!(id = job.id, kind = %job.kind(), "Recurring job disabled, leaving it due");
            report.recurring_skipped += 1;
            return Ok(());
        }

        info!(id = job.id, kind = %job.kind(), label = %job.label, "Running recurring job");
        let summary = action.run(job).await?;
        self.ledger.restart_job(job.job_kind).await?;
        self.ledger.record_history(job, summary.as_deref()).await?;
        report.recurring_run += 1;
        Ok(())
    }
}
