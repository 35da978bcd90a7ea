//! Job history and status value objects.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::model::JobRecord;

/// A completed run, appended to `job_history`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobHistoryEntry {
    pub id: i64,
    pub job_id: i64,
    pub job_kind: i32,
    pub label: String,
    pub finished_at: DateTime<Utc>,
    pub summary: Option<String>,
}

/// Snapshot of a recurring job as reported over the cronjob RPC handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CronjobStatus {
    pub id: i64,
    pub kind: i32,
    pub label: String,
    pub counter: i32,
    pub last_run: Option<DateTime<Utc>>,
    pub next_due: Option<DateTime<Utc>>,
    pub enabled: bool,
}

impl CronjobStatus {
    pub fn from_record(record: &JobRecord, interval: Duration, enabled: bool) -> Self {
        Self {
            id: record.id,
            kind: record.job_kind,
            label: record.label.clone(),
            counter: record.counter,
            last_run: record.created_at,
            next_due: record.next_due(interval),
            enabled,
        }
    }
}
