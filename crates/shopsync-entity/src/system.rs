//! Filesystem snapshots returned by the uploads RPC handler.
//!
//! These are built by directory enumeration at request time and never
//! persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single file below the uploads root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFile {
    /// Absolute path on the server.
    #[serde(skip_serializing, default)]
    pub path: String,
    /// Path relative to the uploads root, `/`-separated.
    pub relative_path: String,
    pub name: String,
    pub extension: String,
    pub modified_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// A folder and everything below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemFolder {
    #[serde(skip_serializing, default)]
    pub path: String,
    pub relative_path: String,
    pub name: String,
    pub modified_at: DateTime<Utc>,
    pub files: Vec<SystemFile>,
    pub folders: Vec<SystemFolder>,
}

impl SystemFolder {
    /// Number of files in this folder and all descendants.
    pub fn total_files(&self) -> usize {
        self.files.len() + self.folders.iter().map(SystemFolder::total_files).sum::<usize>()
    }
}
