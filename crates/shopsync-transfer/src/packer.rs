//! Outbound archive creation for push responses.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_core::result::AppResult;

/// One file placed into an outbound archive.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub name: String,
    pub content: Vec<u8>,
}

impl ArchiveMember {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }
}

/// Pack members into a deflated ZIP held in memory.
pub fn pack_members(members: &[ArchiveMember]) -> AppResult<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for member in members {
            zip.start_file(member.name.as_str(), options).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Archive,
                    format!("Failed to add '{}' to archive", member.name),
                    e,
                )
            })?;
            zip.write_all(&member.content).map_err(|e| {
                AppError::with_source(
                    ErrorKind::Archive,
                    format!("Failed to write '{}' into archive", member.name),
                    e,
                )
            })?;
        }

        zip.finish()
            .map_err(|e| AppError::with_source(ErrorKind::Archive, "Failed to finalize archive", e))?;
    }
    Ok(buffer.into_inner())
}

/// `<stem>_<YYYYMMDDHHMMSS>.zip`.
pub fn archive_file_name(stem: &str, at: DateTime<Utc>) -> String {
    format!("{stem}_{}.zip", at.format("%Y%m%d%H%M%S"))
}
