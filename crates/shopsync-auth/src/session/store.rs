//! Cache-backed sessions for the secondary RPC protocol.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use shopsync_cache::CacheManager;
use shopsync_cache::keys;
use shopsync_core::config::session::SessionConfig;
use shopsync_core::result::AppResult;
use shopsync_core::traits::cache::CacheProvider;

/// Session state kept under the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcSession {
    pub authenticated: bool,
    pub started_at: DateTime<Utc>,
}

/// Starts and resumes RPC sessions.
#[derive(Debug, Clone)]
pub struct RpcSessionStore {
    cache: CacheManager,
    ttl: Duration,
}

impl RpcSessionStore {
    pub fn new(cache: CacheManager, config: &SessionConfig) -> Self {
        Self {
            cache,
            ttl: Duration::from_secs(config.rpc_ttl_minutes * 60),
        }
    }

    /// Start a new authenticated session and return its token.
    pub async fn start_authenticated(&self) -> AppResult<String> {
        let token = Uuid::new_v4().simple().to_string();
        let session = RpcSession {
            authenticated: true,
            started_at: Utc::now(),
        };
        let value = serde_json::to_string(&session)?;
        self.cache.set(&keys::rpc_session(&token), &value, self.ttl).await?;
        debug!(token = %token, "RPC session started");
        Ok(token)
    }

    /// Load a session by token. Unknown or expired tokens yield `None`.
    pub async fn resume(&self, token: &str) -> AppResult<Option<RpcSession>> {
        match self.cache.get(&keys::rpc_session(token)).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Whether the token names a session that passed authentication.
    pub async fn is_authenticated(&self, token: &str) -> AppResult<bool> {
        Ok(self
            .resume(token)
            .await?
            .is_some_and(|session| session.authenticated))
    }

    pub async fn end(&self, token: &str) -> AppResult<()> {
        self.cache.delete(&keys::rpc_session(token)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::config::cache::CacheConfig;

    fn store() -> RpcSessionStore {
        RpcSessionStore::new(
            CacheManager::new(&CacheConfig::default()),
            &SessionConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_started_session_resumes() {
        let sessions = store();
        let token = sessions.start_authenticated().await.unwrap();
        assert_eq!(token.len(), 32);
        assert!(sessions.is_authenticated(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_and_ended_tokens_are_rejected() {
        let sessions = store();
        assert!(!sessions.is_authenticated("nope").await.unwrap());

        let token = sessions.start_authenticated().await.unwrap();
        sessions.end(&token).await.unwrap();
        assert!(!sessions.is_authenticated(&token).await.unwrap());
    }
}
