//! Writes dispatcher values to HTTP responses.

use std::path::PathBuf;

use axum::Json;
use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_core::result::AppResult;
use shopsync_service::SyncResponse;
use shopsync_service::rpc::{FileDownload, RpcOutcome};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Render a dispatcher result. `user_agent` only matters for downloads.
pub async fn render(response: SyncResponse, user_agent: Option<&str>) -> AppResult<Response> {
    match response {
        SyncResponse::Status(status) => text(status.line()),
        SyncResponse::StatusWithPayload {
            status,
            payload,
            charset,
        } => {
            let mut body = format!("{}\n", status.line()).into_bytes();
            body.extend_from_slice(&payload);
            build(
                Response::builder()
                    .status(StatusCode::OK)
                    .header(header::CONTENT_TYPE, format!("text/plain; charset={charset}"))
                    .body(Body::from(body)),
            )
        }
        SyncResponse::Archive { file_name, bytes } => build(
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .header(header::CONTENT_DISPOSITION, content_disposition("attachment", &file_name))
                .header(header::CONTENT_LENGTH, bytes.len())
                .header(header::CACHE_CONTROL, "no-store")
                .body(Body::from(bytes)),
        ),
        SyncResponse::Literal(body) | SyncResponse::Text(body) => text(body),
        SyncResponse::Empty => Ok(StatusCode::OK.into_response()),
        SyncResponse::Rpc(RpcOutcome::Envelope(envelope)) => Ok(Json(envelope).into_response()),
        SyncResponse::Rpc(RpcOutcome::FileDownload(download)) => stream_download(download, user_agent).await,
    }
}

fn text(body: String) -> AppResult<Response> {
    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, TEXT_PLAIN)
            .body(Body::from(body)),
    )
}

fn build(response: Result<Response, axum::http::Error>) -> AppResult<Response> {
    response.map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// Old Internet Explorer only opens the file with this content type.
fn is_legacy_browser(user_agent: Option<&str>) -> bool {
    user_agent.is_some_and(|ua| ua.contains("MSIE") || ua.contains("Trident"))
}

/// Removes the served file once the body stream is gone.
#[derive(Debug)]
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.0) {
            Ok(()) => debug!(path = %self.0.display(), "Served upload removed"),
            Err(e) => warn!(path = %self.0.display(), error = %e, "Failed to remove served upload"),
        }
    }
}

/// `<disposition>; filename="<name>"` with the name as a quoted string.
/// Control characters cannot appear in a header and become `_`.
fn content_disposition(disposition: &str, file_name: &str) -> String {
    let mut quoted = String::with_capacity(file_name.len());
    for c in file_name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push('_'),
            c => quoted.push(c),
        }
    }
    format!("{disposition}; filename=\"{quoted}\"")
}

async fn stream_download(download: FileDownload, user_agent: Option<&str>) -> AppResult<Response> {
    let file = tokio::fs::File::open(&download.path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to open {}", download.path.display()),
            e,
        )
    })?;
    let length = file.metadata().await?.len();

    let (content_type, disposition) = if is_legacy_browser(user_agent) {
        ("application/octetstream", "inline")
    } else {
        ("application/octet-stream", "attachment")
    };

    let guard = RemoveOnDrop(download.path);
    let stream = ReaderStream::new(file).map(move |chunk| {
        let _ = &guard;
        chunk
    });

    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(
                header::CONTENT_DISPOSITION,
                content_disposition(disposition, &download.file_name),
            )
            .header(header::CONTENT_LENGTH, length)
            .header(header::CACHE_CONTROL, "no-store")
            .body(Body::from_stream(stream)),
    )
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use shopsync_service::dispatch::SyncStatus;

    use super::*;

    #[test]
    fn test_legacy_browser_sniffing() {
        assert!(is_legacy_browser(Some("Mozilla/4.0 (compatible; MSIE 8.0)")));
        assert!(is_legacy_browser(Some("Mozilla/5.0 (Windows NT 10.0; Trident/7.0)")));
        assert!(!is_legacy_browser(Some("Mozilla/5.0 Firefox/120.0")));
        assert!(!is_legacy_browser(None));
    }

    #[tokio::test]
    async fn test_status_with_payload() {
        let response = render(
            SyncResponse::StatusWithPayload {
                status: SyncStatus::Ok,
                payload: b"<x/>".to_vec(),
                charset: "windows-1252",
            },
            None,
        )
        .await
        .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain; charset=windows-1252");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"0\n<x/>");
    }

    #[tokio::test]
    async fn test_download_is_removed_after_streaming() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bild.jpg");
        std::fs::write(&path, b"jpegdata").unwrap();

        let response = render(
            SyncResponse::Rpc(RpcOutcome::FileDownload(FileDownload {
                path: path.clone(),
                file_name: "bild.jpg".into(),
            })),
            Some("Mozilla/4.0 (compatible; MSIE 7.0)"),
        )
        .await
        .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octetstream");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "inline; filename=\"bild.jpg\""
        );
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"jpegdata");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_download_name_is_quoted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("upload.bin");
        std::fs::write(&path, b"x").unwrap();

        let response = render(
            SyncResponse::Rpc(RpcOutcome::FileDownload(FileDownload {
                path,
                file_name: "a\"b\\c\r\nd.jpg".into(),
            })),
            None,
        )
        .await
        .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/octet-stream");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"a\\\"b\\\\c__d.jpg\""
        );
    }

    #[test]
    fn test_content_disposition_passes_plain_names() {
        assert_eq!(
            content_disposition("attachment", "GetKunden_20240301101530.zip"),
            "attachment; filename=\"GetKunden_20240301101530.zip\""
        );
    }
}
