//! `Test`: lets the client check credentials and scratch space.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use shopsync_core::error::AppError;
use shopsync_core::result::AppResult;

use crate::dispatch::{ClientInfo, DirectHandler, SyncRequest, SyncResponse, SyncStatus};

const WRITE_CHECK_FILE: &str = ".shopsync-write-check";

#[derive(Debug, Clone)]
pub struct SelfTestHandler {
    scratch_root: PathBuf,
}

impl SelfTestHandler {
    pub fn new(scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            scratch_root: scratch_root.into(),
        }
    }
}

#[async_trait]
impl DirectHandler for SelfTestHandler {
    async fn run(&self, _request: &SyncRequest, client: &ClientInfo) -> AppResult<SyncResponse> {
        let marker = self.scratch_root.join(WRITE_CHECK_FILE);
        let writable = async {
            tokio::fs::create_dir_all(&self.scratch_root).await?;
            tokio::fs::write(&marker, b"ok").await?;
            tokio::fs::remove_file(&marker).await
        };
        writable.await.map_err(|e| {
            AppError::with_source(
                shopsync_core::error::ErrorKind::Storage,
                format!("Sync scratch space {} is not writable", self.scratch_root.display()),
                e,
            )
        })?;

        debug!(client = ?client.version, "Self-test passed");
        Ok(SyncResponse::status(SyncStatus::Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passes_on_writable_scratch() {
        let tmp = tempfile::tempdir().unwrap();
        let handler = SelfTestHandler::new(tmp.path().join("sync_tmp"));
        let response = handler
            .run(&SyncRequest::new("Test"), &ClientInfo::default())
            .await
            .unwrap();
        assert_eq!(response.status_code(), Some(0));
        assert!(!tmp.path().join("sync_tmp").join(WRITE_CHECK_FILE).exists());
    }

    #[tokio::test]
    async fn test_fails_when_scratch_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocked = tmp.path().join("sync_tmp");
        std::fs::write(&blocked, b"").unwrap();
        let err = SelfTestHandler::new(&blocked)
            .run(&SyncRequest::new("Test"), &ClientInfo::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, shopsync_core::error::ErrorKind::Storage);
    }
}
