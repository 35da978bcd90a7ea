//! Storage traits the gateway is written against.
//!
//! Each trait has a Postgres implementation in [`crate::repositories`] and
//! an in-memory one in [`crate::memory`] for single-node use and tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use shopsync_core::result::AppResult;
use shopsync_entity::credential::SyncCredential;
use shopsync_entity::job::{JobHistoryEntry, JobRecord, JobType, NewOneShotJob};

/// Access to the synchronization credential row.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the credential row. `None` when the table is empty.
    async fn load(&self) -> AppResult<Option<SyncCredential>>;

    /// Replace the credential with a new name and password hash.
    async fn replace(&self, name: &str, password_hash: &str) -> AppResult<SyncCredential>;
}

/// The one-shot/recurring job ledger.
///
/// No method takes a lock: concurrent sweeps may observe the same
/// recurring row as due and both run it.
#[async_trait]
pub trait JobLedger: Send + Sync + std::fmt::Debug + 'static {
    /// List ledger rows, optionally restricted to one type, ordered by id.
    async fn list(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>>;

    /// Insert an unfinished one-shot row.
    async fn enqueue_one_shot(&self, job: &NewOneShotJob) -> AppResult<JobRecord>;

    /// One-shot rows already marked finished.
    async fn finished_one_shots(&self) -> AppResult<Vec<JobRecord>>;

    /// Mark every unfinished one-shot row finished. Returns the row count.
    async fn mark_one_shots_finished(&self) -> AppResult<u64>;

    /// Delete rows by id. Returns the row count.
    async fn delete(&self, ids: &[i64]) -> AppResult<u64>;

    /// Recurring rows never armed or armed before `now - interval`.
    async fn due_recurring(&self, interval: Duration) -> AppResult<Vec<JobRecord>>;

    /// Increment the counter of a row.
    async fn bump_counter(&self, id: i64) -> AppResult<()>;

    /// Re-arm the recurring rows of a kind: counter 0, armed now.
    async fn restart_job(&self, job_kind: i32) -> AppResult<()>;

    /// Disarm the recurring rows of a kind so the next sweep runs them.
    /// Returns `false` when no row of that kind exists.
    async fn trigger(&self, job_kind: i32) -> AppResult<bool>;

    /// Append a history entry for a completed run.
    async fn record_history(&self, job: &JobRecord, summary: Option<&str>) -> AppResult<()>;

    /// Most recent history entries, newest first.
    async fn history(&self, job_kind: Option<i32>, limit: i64) -> AppResult<Vec<JobHistoryEntry>>;

    /// Delete history entries finished before `cutoff`.
    async fn prune_history(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Storefront maintenance passes run by every sweep.
#[async_trait]
pub trait ShopMaintenance: Send + Sync + std::fmt::Debug + 'static {
    /// Set the global last-change timestamp to now.
    async fn touch_last_changed(&self) -> AppResult<()>;

    /// Read the global last-change timestamp.
    async fn last_changed(&self) -> AppResult<Option<DateTime<Utc>>>;

    /// Recompute manufacturer active flags from product references.
    /// Returns the number of manufacturers whose flag changed.
    async fn refresh_manufacturer_flags(&self) -> AppResult<u64>;
}
