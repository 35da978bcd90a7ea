//! Storefront maintenance queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_core::result::AppResult;

use crate::store::ShopMaintenance;

const LAST_CHANGE_KEY: &str = "last_global_change";

#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: PgPool,
}

impl ShopRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ShopMaintenance for ShopRepository {
    async fn touch_last_changed(&self) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO shop_state (key, value_timestamp) VALUES ($1, NOW()) \
             ON CONFLICT (key) DO UPDATE SET value_timestamp = EXCLUDED.value_timestamp",
        )
        .bind(LAST_CHANGE_KEY)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch last change", e))?;
        Ok(())
    }

    async fn last_changed(&self) -> AppResult<Option<DateTime<Utc>>> {
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT value_timestamp FROM shop_state WHERE key = $1",
        )
        .bind(LAST_CHANGE_KEY)
        .fetch_optional(&self.pool)
        .await
        .map(Option::flatten)
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to read last change", e))
    }

    async fn refresh_manufacturer_flags(&self) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE manufacturers m \
             SET active = EXISTS (SELECT 1 FROM products p WHERE p.manufacturer_id = m.id) \
             WHERE m.active IS DISTINCT FROM EXISTS (SELECT 1 FROM products p WHERE p.manufacturer_id = m.id)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to refresh manufacturer flags", e)
        })?;
        Ok(result.rows_affected())
    }
}
