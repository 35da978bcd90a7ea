//! Purging of the sync scratch root.

use std::path::Path;
use std::time::{Duration, SystemTime};

use tokio::fs;
use tracing::{debug, warn};

/// Outcome of a purge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeReport {
    pub removed: u64,
    /// Entries younger than the grace period.
    pub kept: u64,
}

/// Remove every direct entry of `root` last modified more than `grace`
/// ago. A zero grace removes everything. A missing root is not an error.
pub async fn purge(root: &Path, grace: Duration) -> std::io::Result<PurgeReport> {
    let mut report = PurgeReport::default();
    let mut entries = match fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = entry.metadata().await?;

        if !grace.is_zero() {
            let age = metadata
                .modified()
                .ok()
                .and_then(|m| now.duration_since(m).ok())
                .unwrap_or_default();
            if age < grace {
                report.kept += 1;
                continue;
            }
        }

        let removed = if metadata.is_dir() {
            fs::remove_dir_all(&path).await
        } else {
            fs::remove_file(&path).await
        };
        match removed {
            Ok(()) => report.removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to purge scratch entry"),
        }
    }

    debug!(removed = report.removed, kept = report.kept, "Scratch root purged");
    Ok(report)
}
