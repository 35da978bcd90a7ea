//! In-memory credential store.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use shopsync_core::result::AppResult;
use shopsync_entity::credential::SyncCredential;

use crate::store::CredentialStore;

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    credential: Arc<RwLock<Option<SyncCredential>>>,
}

impl MemoryCredentialStore {
    /// A store with no credential row.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A store holding one credential.
    pub fn with_credential(name: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            credential: Arc::new(RwLock::new(Some(SyncCredential {
                id: 1,
                name: name.into(),
                password_hash: password_hash.into(),
            }))),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> AppResult<Option<SyncCredential>> {
        Ok(self.credential.read().await.clone())
    }

    async fn replace(&self, name: &str, password_hash: &str) -> AppResult<SyncCredential> {
        let mut guard = self.credential.write().await;
        let id = guard.as_ref().map(|c| c.id + 1).unwrap_or(1);
        let credential = SyncCredential {
            id,
            name: name.to_string(),
            password_hash: password_hash.to_string(),
        };
        *guard = Some(credential.clone());
        Ok(credential)
    }
}
