//! Credential repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_core::result::AppResult;
use shopsync_entity::credential::SyncCredential;

use crate::store::CredentialStore;

/// Reads and replaces the `sync_credentials` row.
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn load(&self) -> AppResult<Option<SyncCredential>> {
        let mut rows = sqlx::query_as::<_, SyncCredential>(
            "SELECT id, name, password_hash FROM sync_credentials ORDER BY id LIMIT 2",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load sync credential", e))?;

        if rows.len() > 1 {
            warn!("More than one sync credential row present, using the oldest");
        }
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn replace(&self, name: &str, password_hash: &str) -> AppResult<SyncCredential> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e))?;

        sqlx::query("DELETE FROM sync_credentials")
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear sync credential", e))?;

        let credential = sqlx::query_as::<_, SyncCredential>(
            "INSERT INTO sync_credentials (name, password_hash) VALUES ($1, $2) \
             RETURNING id, name, password_hash",
        )
        .bind(name)
        .bind(password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store sync credential", e))?;

        tx.commit()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to commit sync credential", e))?;

        Ok(credential)
    }
}
