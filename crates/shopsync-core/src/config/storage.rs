//! Filesystem layout configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Directories used by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for all runtime data.
    #[serde(default = "default_data_root")]
    pub data_root: String,
    /// Scratch root receiving uploaded archives and their extraction
    /// directories.
    #[serde(default = "default_sync_temp")]
    pub sync_temp_dir: String,
    /// Files offered to the ERP client through the uploads RPC handler.
    #[serde(default = "default_uploads")]
    pub uploads_dir: String,
    /// Staging area where the inbox pull handler drops imported payloads.
    #[serde(default = "default_inbox")]
    pub inbox_dir: String,
    /// Staging area read by the outbox push handler.
    #[serde(default = "default_outbox")]
    pub outbox_dir: String,
}

impl StorageConfig {
    /// Build a layout where every directory lives under `root`.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root: PathBuf = root.into();
        let sub = |name: &str| root.join(name).to_string_lossy().into_owned();
        Self {
            data_root: root.to_string_lossy().into_owned(),
            sync_temp_dir: sub("sync_tmp"),
            uploads_dir: sub("uploads"),
            inbox_dir: sub("inbox"),
            outbox_dir: sub("outbox"),
        }
    }

    pub fn sync_temp_path(&self) -> PathBuf {
        PathBuf::from(&self.sync_temp_dir)
    }

    pub fn uploads_path(&self) -> PathBuf {
        PathBuf::from(&self.uploads_dir)
    }

    pub fn inbox_path(&self) -> PathBuf {
        PathBuf::from(&self.inbox_dir)
    }

    pub fn outbox_path(&self) -> PathBuf {
        PathBuf::from(&self.outbox_dir)
    }

    /// All directories the gateway expects to exist at startup.
    pub fn all_dirs(&self) -> Vec<PathBuf> {
        vec![
            PathBuf::from(&self.data_root),
            self.sync_temp_path(),
            self.uploads_path(),
            self.inbox_path(),
            self.outbox_path(),
        ]
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            sync_temp_dir: default_sync_temp(),
            uploads_dir: default_uploads(),
            inbox_dir: default_inbox(),
            outbox_dir: default_outbox(),
        }
    }
}

fn default_data_root() -> String {
    "./data".to_string()
}

fn default_sync_temp() -> String {
    "./data/sync_tmp".to_string()
}

fn default_uploads() -> String {
    "./data/uploads".to_string()
}

fn default_inbox() -> String {
    "./data/inbox".to_string()
}

fn default_outbox() -> String {
    "./data/outbox".to_string()
}
