//! Job ledger repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_core::result::AppResult;
use shopsync_entity::job::{JobHistoryEntry, JobRecord, JobType, NewOneShotJob};

use crate::store::JobLedger;

const COLUMNS: &str = "id, job_type, job_kind, name, label, counter, created_at, finished";

/// Postgres-backed job ledger over `job_ledger` and `job_history`.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: PgPool,
}

impl JobRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_err(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl JobLedger for JobRepository {
    async fn list(&self, job_type: Option<JobType>) -> AppResult<Vec<JobRecord>> {
        sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {COLUMNS} FROM job_ledger \
             WHERE ($1::TEXT IS NULL OR job_type = $1) ORDER BY id"
        ))
        .bind(job_type.map(|t| t.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to list jobs"))
    }

    async fn enqueue_one_shot(&self, job: &NewOneShotJob) -> AppResult<JobRecord> {
        sqlx::query_as::<_, JobRecord>(&format!(
            "INSERT INTO job_ledger (job_type, job_kind, name, label, created_at, finished) \
             VALUES ('STD', $1, $2, $3, NOW(), FALSE) RETURNING {COLUMNS}"
        ))
        .bind(job.job_kind)
        .bind(&job.name)
        .bind(&job.label)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("Failed to enqueue one-shot job"))
    }

    async fn finished_one_shots(&self) -> AppResult<Vec<JobRecord>> {
        sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {COLUMNS} FROM job_ledger \
             WHERE job_type = 'STD' AND finished = TRUE ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load finished one-shot jobs"))
    }

    async fn mark_one_shots_finished(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE job_ledger SET finished = TRUE WHERE job_type = 'STD' AND finished = FALSE",
        )
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to mark one-shot jobs finished"))?;
        Ok(result.rows_affected())
    }

    async fn delete(&self, ids: &[i64]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM job_ledger WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to delete jobs"))?;
        Ok(result.rows_affected())
    }

    async fn due_recurring(&self, interval: Duration) -> AppResult<Vec<JobRecord>> {
        let cutoff = Utc::now() - interval;
        sqlx::query_as::<_, JobRecord>(&format!(
            "SELECT {COLUMNS} FROM job_ledger \
             WHERE job_type = 'RPT' AND (created_at IS NULL OR created_at < $1) ORDER BY id"
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load due recurring jobs"))
    }

    async fn bump_counter(&self, id: i64) -> AppResult<()> {
        sqlx::query("UPDATE job_ledger SET counter = counter + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to bump job counter"))?;
        Ok(())
    }

    async fn restart_job(&self, job_kind: i32) -> AppResult<()> {
        sqlx::query(
            "UPDATE job_ledger SET counter = 0, created_at = NOW() \
             WHERE job_type = 'RPT' AND job_kind = $1",
        )
        .bind(job_kind)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to restart job"))?;
        Ok(())
    }

    async fn trigger(&self, job_kind: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE job_ledger SET created_at = NULL WHERE job_type = 'RPT' AND job_kind = $1",
        )
        .bind(job_kind)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to trigger job"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_history(&self, job: &JobRecord, summary: Option<&str>) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO job_history (job_id, job_kind, label, finished_at, summary) \
             VALUES ($1, $2, $3, NOW(), $4)",
        )
        .bind(job.id)
        .bind(job.job_kind)
        .bind(&job.label)
        .bind(summary)
        .execute(&self.pool)
        .await
        .map_err(db_err("Failed to record job history"))?;
        Ok(())
    }

    async fn history(&self, job_kind: Option<i32>, limit: i64) -> AppResult<Vec<JobHistoryEntry>> {
        sqlx::query_as::<_, JobHistoryEntry>(
            "SELECT id, job_id, job_kind, label, finished_at, summary FROM job_history \
             WHERE ($1::INTEGER IS NULL OR job_kind = $1) \
             ORDER BY finished_at DESC, id DESC LIMIT $2",
        )
        .bind(job_kind)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("Failed to load job history"))
    }

    async fn prune_history(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM job_history WHERE finished_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(db_err("Failed to prune job history"))?;
        Ok(result.rows_affected())
    }
}
