//! Browsing and downloading the uploads directory over RPC.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use shopsync_core::result::AppResult;
use shopsync_entity::system::SystemFile;
use shopsync_transfer::listing;

use super::codes;
use super::envelope::RpcCode;
use super::handler::{FileDownload, RpcContext, RpcHandler, RpcOutcome};

#[derive(Debug, Clone)]
pub struct UploadRpcHandler {
    root: PathBuf,
}

impl UploadRpcHandler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the `folder` field (default: the root) to an existing directory.
    fn folder(&self, ctx: &RpcContext<'_>) -> Option<PathBuf> {
        let relative = ctx.request.param("folder").unwrap_or_default();
        listing::resolve_within(&self.root, relative).filter(|p| p.is_dir())
    }

    async fn all_files(&self, token: &str) -> AppResult<RpcOutcome> {
        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || -> std::io::Result<Vec<SystemFile>> {
            if !root.is_dir() {
                return Ok(Vec::new());
            }
            let tree = listing::folder_tree(&root, &root)?;
            let mut files = Vec::with_capacity(tree.total_files());
            let mut pending = vec![tree];
            while let Some(folder) = pending.pop() {
                files.extend(folder.files);
                pending.extend(folder.folders);
            }
            files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
            Ok(files)
        })
        .await??;
        Ok(RpcOutcome::ok(token, serde_json::to_value(files)?))
    }

    async fn folder_tree(&self, ctx: &RpcContext<'_>) -> AppResult<RpcOutcome> {
        let Some(folder) = self.folder(ctx) else {
            return Ok(RpcOutcome::error(RpcCode::FolderNotExists, &ctx.token));
        };
        let root = self.root.clone();
        let tree = tokio::task::spawn_blocking(move || listing::folder_tree(&root, &folder)).await??;
        Ok(RpcOutcome::ok(&ctx.token, serde_json::to_value(tree)?))
    }

    async fn folder_files(&self, ctx: &RpcContext<'_>) -> AppResult<RpcOutcome> {
        let Some(folder) = self.folder(ctx) else {
            return Ok(RpcOutcome::error(RpcCode::FolderNotExists, &ctx.token));
        };
        let root = self.root.clone();
        let files = tokio::task::spawn_blocking(move || listing::list_files(&root, &folder)).await??;
        Ok(RpcOutcome::ok(&ctx.token, serde_json::to_value(files)?))
    }

    fn file_data(&self, ctx: &RpcContext<'_>) -> RpcOutcome {
        let Some(relative) = ctx.request.param("file") else {
            return RpcOutcome::error(RpcCode::ErrorDeserialize, &ctx.token);
        };
        match listing::resolve_within(&self.root, relative).filter(|p| p.is_file()) {
            Some(path) => {
                debug!(path = %path.display(), "Serving upload");
                RpcOutcome::FileDownload(FileDownload {
                    file_name: file_name(&path),
                    path,
                })
            }
            None => RpcOutcome::error(RpcCode::FolderNotExists, &ctx.token),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl RpcHandler for UploadRpcHandler {
    fn route(&self) -> &'static str {
        "uploads"
    }

    fn identifier(&self) -> &'static str {
        "SyncUploads"
    }

    async fn handle(&self, ctx: &RpcContext<'_>, request_code: i32) -> AppResult<RpcOutcome> {
        match request_code {
            codes::UPLOAD_LIST => self.all_files(&ctx.token).await,
            codes::UPLOAD_FILE_DATA => Ok(self.file_data(ctx)),
            codes::UPLOAD_FOLDER_TREE => self.folder_tree(ctx).await,
            codes::UPLOAD_FOLDER_FILES => self.folder_files(ctx).await,
            _ => Ok(RpcOutcome::error(RpcCode::Unknown, &ctx.token)),
        }
    }
}
