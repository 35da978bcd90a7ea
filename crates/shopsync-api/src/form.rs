//! Form and multipart extraction for sync requests.
//!
//! The ERP client posts either a urlencoded form or a multipart body with
//! the archive in the `data` field. Query parameters are accepted too;
//! body fields win. The file is spooled to a temporary path that is
//! removed when the form is dropped, unless the archive transfer moved
//! it first.

use std::collections::HashMap;
use std::path::PathBuf;

use axum::extract::multipart::Field;
use axum::extract::{FromRequest, Multipart, Query, Request};
use axum::http::header;
use axum::Form;
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use shopsync_core::error::AppError;
use shopsync_service::SyncRequest;
use shopsync_transfer::{UploadDescriptor, UploadErrorCode};

use crate::error::ApiError;

/// Multipart field carrying the sync archive.
pub const UPLOAD_FIELD: &str = "data";

#[derive(Debug, Default)]
pub struct SyncForm {
    pub params: HashMap<String, String>,
    pub upload: Option<UploadDescriptor>,
    spool: Option<TempPath>,
}

impl SyncForm {
    /// Read query and body fields. Uploads larger than `max_upload` bytes
    /// are cut off and reported with the server-limit code.
    pub async fn extract(request: Request, max_upload: u64) -> Result<Self, ApiError> {
        let mut form = Self::default();
        if let Ok(Query(query)) = Query::<HashMap<String, String>>::try_from_uri(request.uri()) {
            form.params.extend(query);
        }

        let content_type = request
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|e| AppError::validation(format!("Invalid multipart body: {e}")))?;
            form.read_multipart(multipart, max_upload).await?;
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(request, &())
                .await
                .map_err(|e| AppError::validation(format!("Invalid form body: {e}")))?;
            form.params.extend(fields);
        }
        Ok(form)
    }

    async fn read_multipart(&mut self, mut multipart: Multipart, max_upload: u64) -> Result<(), ApiError> {
        while let Some(mut field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == UPLOAD_FIELD && self.upload.is_none() {
                if let Some(original_name) = field.file_name().map(str::to_string) {
                    let (upload, spool) = spool_field(&mut field, original_name, max_upload).await;
                    let interrupted = upload.error == UploadErrorCode::Partial;
                    self.upload = Some(upload);
                    self.spool = spool;
                    if interrupted {
                        break;
                    }
                    continue;
                }
            }
            let value = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Multipart field '{name}': {e}")))?;
            self.params.insert(name, value);
        }
        Ok(())
    }

    /// Split into the dispatcher request and the spool guard, which has
    /// to outlive the dispatch.
    pub fn into_request(
        self,
        request_type: impl Into<String>,
        user_agent: Option<String>,
    ) -> (SyncRequest, Option<TempPath>) {
        let request = SyncRequest {
            request_type: request_type.into(),
            params: self.params,
            upload: self.upload,
            user_agent,
        };
        (request, self.spool)
    }
}

async fn spool_field(
    field: &mut Field<'_>,
    original_name: String,
    max_upload: u64,
) -> (UploadDescriptor, Option<TempPath>) {
    let failed = |error| UploadDescriptor {
        original_name: original_name.clone(),
        temp_path: PathBuf::new(),
        size: 0,
        error,
    };

    let temp = match tempfile::Builder::new().prefix("shopsync-upload-").tempfile() {
        Ok(temp) => temp,
        Err(e) => {
            warn!(error = %e, "Cannot create upload spool file");
            return (failed(UploadErrorCode::NoTmpDir), None);
        }
    };
    let (file, path) = temp.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut size: u64 = 0;
    let mut error = UploadErrorCode::Ok;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                size += chunk.len() as u64;
                if size > max_upload {
                    error = UploadErrorCode::IniSize;
                    break;
                }
                if let Err(e) = file.write_all(&chunk).await {
                    warn!(error = %e, "Writing upload spool file failed");
                    error = UploadErrorCode::CantWrite;
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Upload body interrupted");
                error = UploadErrorCode::Partial;
                break;
            }
        }
    }
    if error == UploadErrorCode::Ok && file.flush().await.is_err() {
        error = UploadErrorCode::CantWrite;
    }

    debug!(name = %original_name, size, code = error.code(), "Upload spooled");
    let upload = UploadDescriptor {
        original_name,
        temp_path: path.to_path_buf(),
        size,
        error,
    };
    (upload, Some(path))
}
