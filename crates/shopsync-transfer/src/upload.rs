//! Uploaded file descriptor and its validation.

use std::path::PathBuf;

use tracing::error;

use crate::error::TransferError;

/// Status reported by the transport for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadErrorCode {
    Ok,
    /// Larger than the server-wide limit.
    IniSize,
    /// Larger than the limit announced by the form.
    FormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
}

impl UploadErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
        }
    }

    pub fn diagnostic(&self) -> &'static str {
        match self {
            Self::Ok => "There is no error, the file uploaded with success",
            Self::IniSize => "The uploaded file exceeds the maximum upload size of the server",
            Self::FormSize => "The uploaded file exceeds the maximum size specified by the form",
            Self::Partial => "The uploaded file was only partially uploaded",
            Self::NoFile => "No file was uploaded",
            Self::NoTmpDir => "Missing a temporary folder",
            Self::CantWrite => "Failed to write file to disk",
            Self::Extension => "File upload stopped by extension",
        }
    }
}

/// A file received by the transport and spooled to a temporary path.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    /// File name announced by the client.
    pub original_name: String,
    /// Where the transport spooled the body.
    pub temp_path: PathBuf,
    pub size: u64,
    pub error: UploadErrorCode,
}

impl UploadDescriptor {
    /// Basename of the announced name with any client-side directories
    /// stripped. Falls back to `upload` for empty or dot names.
    pub fn safe_name(&self) -> String {
        let name = self
            .original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();
        if name.is_empty() || name == "." || name == ".." {
            "upload".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Reject a missing upload, a transport error or an empty body.
pub fn validate(upload: Option<&UploadDescriptor>) -> Result<&UploadDescriptor, TransferError> {
    let rejected = |code: UploadErrorCode| {
        let err = TransferError::InvalidUpload {
            code,
            diagnostic: code.diagnostic().to_string(),
        };
        error!(code = code.code(), error = %err, "Sync upload rejected");
        err
    };

    let upload = upload.ok_or_else(|| rejected(UploadErrorCode::NoFile))?;
    if upload.error != UploadErrorCode::Ok {
        return Err(rejected(upload.error));
    }
    if upload.size == 0 {
        return Err(rejected(UploadErrorCode::NoFile));
    }
    Ok(upload)
}
