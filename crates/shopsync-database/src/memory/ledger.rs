//! In-memory job ledger.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use shopsync_core::result::AppResult;
use shopsync_entity::job::{JobHistoryEntry, JobKind, JobRecord, JobType, NewOneShotJob};

use crate::store::JobLedger;

#[derive(Debug, Default)]
struct LedgerState {
    rows: Vec<JobRecord>,
    history: Vec<JobHistoryEntry>,
    next_id: i64,
    next_history_id: i64,
}

impl LedgerState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Job ledger held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl MemoryJobLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger holding the four built-in recurring rows, all disarmed.
    pub async fn seeded() -> Self {
        let ledger = Self::new();
        for (kind, name, label) in [
            (JobKind::ReviewReminder, "review_reminder", "Review reminder mailing"),
            (JobKind::SitemapExport, "sitemap_export", "Sitemap export"),
            (JobKind::RssExport, "rss_export", "RSS feed export"),
            (JobKind::GarbageCollector, "garbage_collector", "Garbage collection"),
        ] {
            ledger.insert_recurring(kind.code(), name, label, None).await;
        }
        ledger
    }

    /// Insert a recurring row armed at `created_at`.
    pub async fn insert_recurring(
        &self,
        job_kind: i32,
        name: &str,
        label: &str,
        created_at: Option<DateTime<Utc>>,
    ) -> JobRecord {
        let mut state = self.state.lock().await;
        let record = JobRecord {
            id: state.allocate_id(),
            job_type: JobType::Recurring,
            job_kind,
            name: name.to_string(),
            label: label.to_string(),
            counter: 0,
            created_at,
            finished: false,
        };
        state.rows.push(record.clone());
        record
    }

    /// Move the arm time of every recurring row of a kind.
    pub async fn arm_at(&self, job_kind: i32, created_at: Option<DateTime<Utc>>) {
        let mut state = self.state.lock().await;
        for row in state
            .rows
            .iter_mut()
            .filter(|r| r.is_recurring() && r.job_kind == job_kind)
        {
            row.created_at = created_at;
        }
    }

    /// Fetch the recurring row of a kind.
    pub async fn recurring(&self, job_kind: i32) -> Option<JobRecord> {
        self.state
            .lock()
            .await
            .rows
            .iter()
            .find(|r| r.is_recurring() && r.job_kind == job_kind)
            .cloned()
    }
}

#[async_trait]
impl JobLedger for MemoryJobLedger {
    async fn list(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .iter()
            .filter(|r| job_type.is_none_or(|t| r.job_type == t))
            .cloned()
            .collect())
    }

    async fn enqueue_one_shot(&self, job: &NewOneShotJob) -> AppResult<JobRecord> {
        let mut state = self.state.lock().await;
        let record = JobRecord {
            id: state.allocate_id(),
            job_type: JobType::OneShot,
            job_kind: job.job_kind,
            name: job.name.clone(),
            label: job.label.clone(),
            counter: 0,
            created_at: Some(Utc::now()),
            finished: false,
        };
        state.rows.push(record.clone());
        Ok(record)
    }

    async fn finished_one_shots(&self) -> AppResult<Vec<JobRecord>> {
        let state = self.state.lock().await;
        Ok(state
            .rows
            .iter()
            .filter(|r| r.job_type == JobType::OneShot && r.finished)
            .cloned()
            .collect())
    }

    async fn mark_one_shots_finished(&self) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut marked = 0;
        for row in state
            .rows
            .iter_mut()
            .filter(|r| r.job_type == JobType::OneShot && !r.finished)
        {
            row.finished = true;
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete(&self, ids: &[i64]) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.rows.len();
        state.rows.retain(|r| !ids.contains(&r.id));
        Ok((before - state.rows.len()) as u64)
    }

    async fn due_recurring(&self, interval: Duration) -> AppResult<Vec<JobRecord>> {
        let now = Utc::now();
        let state = self.state.lock().await;
        Ok(state
            .rows
            .iter()
            .filter(|r| r.is_recurring() && r.is_due(now, interval))
            .cloned()
            .collect())
    }

    async fn bump_counter(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if let Some(row) = state.rows.iter_mut().find(|r| r.id == id) {
            row.counter += 1;
        }
        Ok(())
    }

    async fn restart_job(&self, job_kind: i32) -> AppResult<()> {
        let now = Utc::now();
        let mut state = self.state.lock().await;
        for row in state
            .rows
            .iter_mut()
            .filter(|r| r.is_recurring() && r.job_kind == job_kind)
        {
            row.counter = 0;
            row.created_at = Some(now);
        }
        Ok(())
    }

    async fn trigger(&self, job_kind: i32) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let mut found = false;
        for row in state
            .rows
            .iter_mut()
            .filter(|r| r.is_recurring() && r.job_kind == job_kind)
        {
            row.created_at = None;
            found = true;
        }
        Ok(found)
    }

    async fn record_history(&self, job: &JobRecord, summary: Option<&str>) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.next_history_id += 1;
        let entry = JobHistoryEntry {
            id: state.next_history_id,
            job_id: job.id,
            job_kind: job.job_kind,
            label: job.label.clone(),
            finished_at: Utc::now(),
            summary: summary.map(str::to_string),
        };
        state.history.push(entry);
        Ok(())
    }

    async fn history(&self, job_kind: Option<i32>, limit: i64) -> AppResult<Vec<JobHistoryEntry>> {
        let state = self.state.lock().await;
        Ok(state
            .history
            .iter()
            .rev()
            .filter(|e| job_kind.is_none_or(|k| e.job_kind == k))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn prune_history(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let before = state.history.len();
        state.history.retain(|e| e.finished_at >= cutoff);
        Ok((before - state.history.len()) as u64)
    }
}
