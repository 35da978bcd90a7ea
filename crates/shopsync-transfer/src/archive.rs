//! Inbound sync archive handling.
//!
//! An [`ArchiveTransfer`] lives for exactly one request. It stages the
//! uploaded file into a staging directory of its own under the sync
//! scratch root, extracts it into a directory named after the archive and
//! the extraction second, and removes both when dropped unless retention
//! was requested.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::TransferError;
use crate::upload::{self, UploadDescriptor};

/// Timestamp suffix of extraction directories, second resolution.
const EXTRACTION_STAMP: &str = "%Y%m%d%H%M%S";

/// Prefix of per-request staging directories.
const STAGING_PREFIX: &str = "upload_";

/// Per-request archive transfer.
#[derive(Debug)]
pub struct ArchiveTransfer {
    scratch_root: PathBuf,
    retain: bool,
    pinned_at: Option<DateTime<Utc>>,
    staging_dir: Option<PathBuf>,
    staged: Option<PathBuf>,
    extraction_dir: Option<PathBuf>,
}

impl ArchiveTransfer {
    /// `retain` keeps every staged and extracted file after drop.
    pub fn new(scratch_root: impl Into<PathBuf>, retain: bool) -> Self {
        Self {
            scratch_root: scratch_root.into(),
            retain,
            pinned_at: None,
            staging_dir: None,
            staged: None,
            extraction_dir: None,
        }
    }

    /// Use a fixed extraction time instead of the wall clock.
    pub fn extracted_at(mut self, at: DateTime<Utc>) -> Self {
        self.pinned_at = Some(at);
        self
    }

    pub fn extraction_dir(&self) -> Option<&Path> {
        self.extraction_dir.as_deref()
    }

    pub fn staged_path(&self) -> Option<&Path> {
        self.staged.as_deref()
    }

    /// Validate, stage and extract the uploaded archive.
    ///
    /// An invalid upload is an error that ends the request. An archive
    /// that cannot be opened or extracted completely yields `Ok(None)`.
    pub async fn sync_files(
        &mut self,
        upload: Option<&UploadDescriptor>,
    ) -> Result<Option<Vec<PathBuf>>, TransferError> {
        let upload = upload::validate(upload)?;
        let staged = self.stage(upload).await?;

        let stamp = self.pinned_at.unwrap_or_else(Utc::now);
        let dir = self
            .scratch_root
            .join(extraction_dir_name(&staged, stamp));
        self.extraction_dir = Some(dir.clone());

        let extracted = tokio::task::spawn_blocking(move || extract(&staged, &dir)).await;
        match extracted {
            Ok(files) => Ok(files),
            Err(e) => {
                error!(error = %e, "Archive extraction task failed");
                Ok(None)
            }
        }
    }

    /// Validate and stage an upload that is not an archive.
    pub async fn stage_raw(
        &mut self,
        upload: Option<&UploadDescriptor>,
    ) -> Result<Vec<PathBuf>, TransferError> {
        let upload = upload::validate(upload)?;
        let staged = self.stage(upload).await?;
        Ok(vec![staged])
    }

    async fn stage(&mut self, upload: &UploadDescriptor) -> Result<PathBuf, TransferError> {
        tokio::fs::create_dir_all(&self.scratch_root)
            .await
            .map_err(TransferError::Staging)?;

        // Uploads sharing a file name must never share a staged path.
        let staging_dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.scratch_root)
            .map_err(TransferError::Staging)?
            .keep();
        self.staging_dir = Some(staging_dir.clone());

        let target = staging_dir.join(upload.safe_name());
        if tokio::fs::rename(&upload.temp_path, &target).await.is_err() {
            // Spool directory on another filesystem.
            tokio::fs::copy(&upload.temp_path, &target)
                .await
                .map_err(TransferError::Staging)?;
            let _ = tokio::fs::remove_file(&upload.temp_path).await;
        }

        debug!(path = %target.display(), size = upload.size, "Upload staged");
        self.staged = Some(target.clone());
        Ok(target)
    }
}

impl Drop for ArchiveTransfer {
    fn drop(&mut self) {
        if self.retain {
            if let Some(dir) = &self.extraction_dir {
                info!(path = %dir.display(), "Retaining sync files");
            }
            return;
        }
        if let Some(dir) = &self.extraction_dir {
            remove_quietly(fs::remove_dir_all(dir), dir);
        }
        if let Some(dir) = &self.staging_dir {
            remove_quietly(fs::remove_dir_all(dir), dir);
        }
    }
}

fn remove_quietly(result: io::Result<()>, path: &Path) {
    if let Err(e) = result {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove sync scratch entry");
        }
    }
}

/// `<archive stem>_<YYYYMMDDHHMMSS>`.
pub fn extraction_dir_name(archive: &Path, at: DateTime<Utc>) -> String {
    let stem = archive
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string());
    format!("{stem}_{}", at.format(EXTRACTION_STAMP))
}

/// Numeric classification of an archive open failure for the log.
pub fn open_error_code(err: &ZipError) -> i32 {
    match err {
        ZipError::FileNotFound => 9,
        ZipError::Io(_) => 11,
        ZipError::InvalidArchive(_) => 19,
        ZipError::UnsupportedArchive(_) => 21,
        _ => 5,
    }
}

fn extract(staged: &Path, dir: &Path) -> Option<Vec<PathBuf>> {
    let opened = File::open(staged)
        .map_err(ZipError::Io)
        .and_then(ZipArchive::new);
    let mut archive = match opened {
        Ok(archive) => archive,
        Err(e) => {
            error!(
                code = open_error_code(&e),
                error = %e,
                archive = %staged.display(),
                "Sync archive cannot be opened"
            );
            remove_quietly(fs::remove_file(staged), staged);
            return None;
        }
    };

    let mut expected = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        match archive.by_index(i) {
            Ok(member) if member.is_file() => match member.enclosed_name() {
                Some(name) => expected.push(dir.join(name)),
                None => warn!(member = %member.name(), "Skipping archive member with unsafe path"),
            },
            Ok(_) => {}
            Err(e) => {
                error!(index = i, error = %e, "Unreadable archive member");
                return None;
            }
        }
    }

    if let Err(e) = fs::create_dir_all(dir) {
        error!(path = %dir.display(), error = %e, "Cannot create extraction directory");
        return None;
    }

    for i in 0..archive.len() {
        if let Err(e) = extract_member(&mut archive, i, dir) {
            error!(index = i, error = %e, "Archive member extraction failed");
            return None;
        }
    }

    let present: Vec<PathBuf> = expected.iter().filter(|p| p.is_file()).cloned().collect();
    if present.len() < expected.len() {
        warn!(
            expected = expected.len(),
            extracted = present.len(),
            "Sync archive extracted incompletely"
        );
        return None;
    }

    debug!(files = present.len(), path = %dir.display(), "Sync archive extracted");
    Some(present)
}

fn extract_member(archive: &mut ZipArchive<File>, index: usize, dir: &Path) -> io::Result<()> {
    let mut member = archive.by_index(index).map_err(io::Error::other)?;
    let Some(name) = member.enclosed_name() else {
        return Ok(());
    };
    let out_path = dir.join(name);

    if member.is_dir() {
        return fs::create_dir_all(&out_path);
    }
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(&out_path)?;
    io::copy(&mut member, &mut out)?;
    Ok(())
}
