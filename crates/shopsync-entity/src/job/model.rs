//! Job ledger row.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::kind::{JobKind, JobType};

/// A row of `job_ledger`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRecord {
    pub id: i64,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    /// Integer action selector for recurring rows.
    pub job_kind: i32,
    /// Registry name resolving a one-shot row to its handler.
    pub name: String,
    /// Operator-facing label.
    pub label: String,
    /// Sweeps that observed this row as due without re-arming it.
    pub counter: i32,
    /// Arm time of a recurring row; `None` means due immediately.
    pub created_at: Option<DateTime<Utc>>,
    pub finished: bool,
}

impl JobRecord {
    pub fn kind(&self) -> JobKind {
        JobKind::from_code(self.job_kind)
    }

    pub fn is_recurring(&self) -> bool {
        self.job_type == JobType::Recurring
    }

    /// Whether a recurring row is due at `now` for the given interval.
    pub fn is_due(&self, now: DateTime<Utc>, interval: Duration) -> bool {
        match self.created_at {
            None => true,
            Some(armed) => now - armed > interval,
        }
    }

    /// When the row becomes due next, or `None` if it already is.
    pub fn next_due(&self, interval: Duration) -> Option<DateTime<Utc>> {
        self.created_at.map(|armed| armed + interval)
    }
}

/// Data required to register a one-shot job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOneShotJob {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub job_kind: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recurring(created_at: Option<DateTime<Utc>>) -> JobRecord {
        JobRecord {
            id: 1,
            job_type: JobType::Recurring,
            job_kind: 2,
            name: "sitemap".into(),
            label: "Sitemap export".into(),
            counter: 0,
            created_at,
            finished: false,
        }
    }

    #[test]
    fn test_never_armed_row_is_due() {
        assert!(recurring(None).is_due(Utc::now(), Duration::hours(12)));
    }

    #[test]
    fn test_due_after_interval() {
        let now = Utc::now();
        let interval = Duration::hours(12);
        assert!(!recurring(Some(now - Duration::hours(11))).is_due(now, interval));
        assert!(recurring(Some(now - Duration::hours(13))).is_due(now, interval));
    }

    #[test]
    fn test_next_due() {
        let armed = Utc::now();
        let row = recurring(Some(armed));
        assert_eq!(row.next_due(Duration::hours(12)), Some(armed + Duration::hours(12)));
        assert_eq!(row.kind(), JobKind::SitemapExport);
    }
}
