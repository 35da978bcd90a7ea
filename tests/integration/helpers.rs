//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use shopsync_api::{GatewayStores, build_app, build_state};
use shopsync_auth::PasswordHasher;
use shopsync_core::config::AppConfig;
use shopsync_core::config::storage::StorageConfig;
use shopsync_database::memory::{MemoryCredentialStore, MemoryJobLedger, MemoryShopMaintenance};

pub const SYNC_USER: &str = "wawi";
pub const SYNC_PASSWORD: &str = "geheim123";
pub const CLIENT_AGENT: &str = "JTL-Wawi/1.9.4";

const BOUNDARY: &str = "shopsync-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Ledger shared with the job runner
    pub ledger: Arc<MemoryJobLedger>,
    _data: TempDir,
}

impl TestApp {
    /// Create a new test application with default settings
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test application after adjusting the configuration
    pub async fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let data = tempfile::tempdir().expect("Failed to create data dir");
        let mut config = AppConfig::with_database_url("postgres://unused@localhost/shop");
        config.storage = StorageConfig::rooted_at(data.path());
        adjust(&mut config);

        for dir in config.storage.all_dirs() {
            std::fs::create_dir_all(dir).expect("Failed to create storage dir");
        }

        let hash = PasswordHasher::new()
            .hash_password(SYNC_PASSWORD)
            .expect("Failed to hash password");
        let ledger = Arc::new(MemoryJobLedger::seeded().await);
        let stores = GatewayStores {
            credentials: Arc::new(MemoryCredentialStore::with_credential(SYNC_USER, hash)),
            ledger: ledger.clone(),
            shop: Arc::new(MemoryShopMaintenance::new()),
        };

        let state = build_state(config.clone(), stores)
            .await
            .expect("Failed to build state");

        Self {
            router: build_app(state),
            config,
            ledger,
            _data: data,
        }
    }

    pub fn inbox(&self, request_type: &str) -> PathBuf {
        self.config.storage.inbox_path().join(request_type)
    }

    pub fn outbox(&self, request_type: &str) -> PathBuf {
        self.config.storage.outbox_path().join(request_type)
    }

    pub fn uploads(&self) -> PathBuf {
        self.config.storage.uploads_path()
    }

    /// POST a body to the test app as the ERP client
    pub async fn post(&self, path: &str, content_type: &str, body: Vec<u8>) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", content_type)
            .header("User-Agent", CLIENT_AGENT)
            .body(Body::from(body))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();

        TestResponse { status, headers, body }
    }

    /// POST a urlencoded form
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.post(path, "application/x-www-form-urlencoded", form_body(fields))
            .await
    }

    /// POST a multipart form with an optional file in the `data` field
    pub async fn post_multipart(
        &self,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        self.post(
            path,
            &format!("multipart/form-data; boundary={BOUNDARY}"),
            multipart_body(fields, file),
        )
        .await
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

/// Credential fields the ERP client sends with every request
pub fn login_fields() -> Vec<(&'static str, &'static str)> {
    vec![("userID", SYNC_USER), ("userPWD", SYNC_PASSWORD)]
}

pub fn form_body(fields: &[(&str, &str)]) -> Vec<u8> {
    fields
        .iter()
        .map(|(k, v)| format!("{}={}", urlencode(k), urlencode(v)))
        .collect::<Vec<_>>()
        .join("&")
        .into_bytes()
}

fn urlencode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
        .expect("Failed to write field");
    }
    if let Some((file_name, content)) = file {
        write!(
            body,
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .expect("Failed to write file header");
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    write!(body, "--{BOUNDARY}--\r\n").expect("Failed to write trailer");
    body
}

/// A zip archive holding the given members
pub fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in members {
        zip.start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("Failed to start zip member");
        zip.write_all(content.as_bytes())
            .expect("Failed to write zip member");
    }
    zip.finish().expect("Failed to finish zip").into_inner()
}
