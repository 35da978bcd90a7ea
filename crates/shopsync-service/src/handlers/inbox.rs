//! Stages pulled payload files for an external importer.
//!
//! Files land in `<inbox>/<request type>/` prefixed with the request
//! timestamp and their position, so repeated pulls never overwrite each
//! other.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::info;

use shopsync_core::result::AppResult;

use crate::dispatch::{PullContext, PullHandler};

#[derive(Debug, Clone)]
pub struct InboxPullHandler {
    inbox_root: PathBuf,
}

impl InboxPullHandler {
    pub fn new(inbox_root: impl Into<PathBuf>) -> Self {
        Self {
            inbox_root: inbox_root.into(),
        }
    }
}

#[async_trait]
impl PullHandler for InboxPullHandler {
    async fn handle(&self, ctx: &PullContext) -> AppResult<Option<Value>> {
        let target_dir = self.inbox_root.join(&ctx.request_type);
        tokio::fs::create_dir_all(&target_dir).await?;

        let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
        let mut staged = Vec::with_capacity(ctx.files.len());
        for (i, file) in ctx.files.iter().enumerate() {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("payload-{i}"));
            let target_name = format!("{stamp}_{i:03}_{name}");
            tokio::fs::copy(file, target_dir.join(&target_name)).await?;
            staged.push(target_name);
        }

        info!(request_type = %ctx.request_type, files = staged.len(), "Payload staged to inbox");
        Ok(Some(json!({
            "identifier": ctx.request_type,
            "staged": staged,
        })))
    }
}
