//! In-memory storefront maintenance.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use shopsync_core::result::AppResult;

use crate::store::ShopMaintenance;

#[derive(Debug, Default)]
struct Catalog {
    last_changed: Option<DateTime<Utc>>,
    /// Manufacturer id to active flag.
    manufacturers: HashMap<i64, bool>,
    /// Manufacturer ids referenced by at least one product.
    referenced: HashSet<i64>,
}

/// Keeps the last-change timestamp and a minimal manufacturer catalog.
#[derive(Debug, Clone, Default)]
pub struct MemoryShopMaintenance {
    catalog: Arc<Mutex<Catalog>>,
}

impl MemoryShopMaintenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_manufacturer(&self, id: i64, active: bool) {
        self.catalog.lock().await.manufacturers.insert(id, active);
    }

    pub async fn add_product(&self, manufacturer_id: i64) {
        self.catalog.lock().await.referenced.insert(manufacturer_id);
    }

    pub async fn is_manufacturer_active(&self, id: i64) -> Option<bool> {
        self.catalog.lock().await.manufacturers.get(&id).copied()
    }
}

#[async_trait]
impl ShopMaintenance for MemoryShopMaintenance {
    async fn touch_last_changed(&self) -> AppResult<()> {
        self.catalog.lock().await.last_changed = Some(Utc::now());
        Ok(())
    }

    async fn last_changed(&self) -> AppResult<Option<DateTime<Utc>>> {
        Ok(self.catalog.lock().await.last_changed)
    }

    async fn refresh_manufacturer_flags(&self) -> AppResult<u64> {
        let mut catalog = self.catalog.lock().await;
        let Catalog {
            manufacturers,
            referenced,
            ..
        } = &mut *catalog;

        let mut changed = 0;
        for (id, active) in manufacturers.iter_mut() {
            let wanted = referenced.contains(id);
            if *active != wanted {
                *active = wanted;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_follows_product_references() {
        let shop = MemoryShopMaintenance::new();
        shop.add_manufacturer(1, false).await;
        shop.add_manufacturer(2, true).await;
        shop.add_manufacturer(3, true).await;
        shop.add_product(1).await;
        shop.add_product(3).await;

        assert_eq!(shop.refresh_manufacturer_flags().await.unwrap(), 2);
        assert_eq!(shop.is_manufacturer_active(1).await, Some(true));
        assert_eq!(shop.is_manufacturer_active(2).await, Some(false));
        assert_eq!(shop.is_manufacturer_active(3).await, Some(true));
        assert_eq!(shop.refresh_manufacturer_flags().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_touch_sets_timestamp() {
        let shop = MemoryShopMaintenance::new();
        assert!(shop.last_changed().await.unwrap().is_none());
        shop.touch_last_changed().await.unwrap();
        assert!(shop.last_changed().await.unwrap().is_some());
    }
}
