//! The sync dispatcher.
//!
//! Routing order: maintenance marker, special identifiers, RPC
//! identifiers, pull table, push table. Anything else gets an empty
//! response. Handler errors are returned unchanged.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use shopsync_auth::SyncLogin;
use shopsync_core::config::gateway::GatewayConfig;
use shopsync_core::config::storage::StorageConfig;
use shopsync_core::error::AppError;
use shopsync_core::result::AppResult;
use shopsync_transfer::ArchiveTransfer;
use shopsync_transfer::packer::{self, ArchiveMember};

use super::client::{ClientInfo, ClientVersion};
use super::context::{PullContext, PushContext, SyncRequest};
use super::encoding;
use super::registry::{HandlerRegistry, PushPayload};
use super::response::{SyncResponse, SyncStatus};
use super::xml;
use crate::rpc::{RpcLayer, RpcRequest};

/// Runs the maintenance sweep.
pub const LAST_JOBS: &str = "LastJobs";
/// Connectivity self-test.
pub const SELF_TEST: &str = "Test";
/// Legacy image API.
pub const IMAGE_API: &str = "ImageApi";
/// Pull identifier whose upload is handed over without extraction.
pub const RAW_PAYLOAD: &str = "Bilder_upload";
/// Pull identifier whose handler result is echoed as XML.
pub const LEGACY_PAYLOAD: &str = "SetKunde_xml";

const SPECIAL_IDENTIFIERS: [&str; 3] = [LAST_JOBS, SELF_TEST, IMAGE_API];

/// Dispatcher switches taken from configuration.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub maintenance_mode: bool,
    pub retain_sync_files: bool,
    pub scratch_root: PathBuf,
    pub agent_marker: String,
    pub utf8_from: ClientVersion,
}

impl DispatchSettings {
    pub fn from_config(gateway: &GatewayConfig, storage: &StorageConfig) -> AppResult<Self> {
        let utf8_from = ClientVersion::parse(&gateway.utf8_min_client_version).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid gateway.utf8_min_client_version '{}'",
                gateway.utf8_min_client_version
            ))
        })?;
        Ok(Self {
            maintenance_mode: gateway.maintenance_mode,
            retain_sync_files: gateway.retain_sync_files,
            scratch_root: storage.sync_temp_path(),
            agent_marker: gateway.client_agent_marker.clone(),
            utf8_from,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    login: Arc<SyncLogin>,
    registry: HandlerRegistry,
    rpc: RpcLayer,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(
        login: Arc<SyncLogin>,
        registry: HandlerRegistry,
        rpc: RpcLayer,
        settings: DispatchSettings,
    ) -> Self {
        info!(
            handlers = registry.len(),
            maintenance = settings.maintenance_mode,
            "Sync dispatcher ready"
        );
        Self {
            login,
            registry,
            rpc,
            settings,
        }
    }

    pub fn rpc(&self) -> &RpcLayer {
        &self.rpc
    }

    /// Route one sync request to its handler.
    pub async fn start(&self, request: SyncRequest) -> AppResult<SyncResponse> {
        if self.settings.maintenance_mode {
            return Ok(SyncResponse::maintenance());
        }

        let client = ClientInfo::from_user_agent(request.user_agent.as_deref(), &self.settings.agent_marker);
        let request_type = request.request_type.as_str();
        debug!(request_type, client = ?client.version, "Dispatching sync request");

        if SPECIAL_IDENTIFIERS.contains(&request_type) {
            if !self.authenticated(&request) {
                return Ok(SyncResponse::status(SyncStatus::Unauthorized));
            }
            return match self.registry.direct(request_type) {
                Some(handler) => handler.run(&request, &client).await,
                None => {
                    warn!(request_type, "No handler registered for special identifier");
                    Ok(SyncResponse::Empty)
                }
            };
        }

        if self.rpc.handles(request_type) {
            let outcome = self.rpc.dispatch(request_type, &RpcRequest::from_sync(&request)).await?;
            return Ok(SyncResponse::Rpc(outcome));
        }

        if self.registry.pull(request_type).is_some() {
            return self.pull(request, client).await;
        }
        if self.registry.push(request_type).is_some() {
            return self.push(request, client).await;
        }

        debug!(request_type, "Unknown sync request type");
        Ok(SyncResponse::Empty)
    }

    fn authenticated(&self, request: &SyncRequest) -> bool {
        let verified = request
            .credentials()
            .is_some_and(|c| self.login.verify(&c.username, &c.password));
        if !verified {
            warn!(request_type = %request.request_type, "Sync authentication failed");
        }
        verified
    }

    async fn pull(&self, request: SyncRequest, client: ClientInfo) -> AppResult<SyncResponse> {
        if !self.authenticated(&request) {
            return Ok(SyncResponse::status(SyncStatus::Unauthorized));
        }
        let Some(handler) = self.registry.pull(&request.request_type) else {
            return Ok(SyncResponse::Empty);
        };

        // Lives until the handler is done with the extracted files.
        let mut transfer = ArchiveTransfer::new(&self.settings.scratch_root, self.settings.retain_sync_files);
        let files = if request.request_type == RAW_PAYLOAD {
            transfer.stage_raw(request.upload.as_ref()).await?
        } else {
            match transfer.sync_files(request.upload.as_ref()).await? {
                Some(files) => files,
                None => return Ok(SyncResponse::status(SyncStatus::ArchiveFailed)),
            }
        };

        let legacy = request.request_type == LEGACY_PAYLOAD;
        let ctx = PullContext {
            request_type: request.request_type,
            files,
            client,
            params: request.params,
        };
        let result = handler.handle(&ctx).await?;
        info!(request_type = %ctx.request_type, files = ctx.files.len(), "Pull handled");

        match result {
            Some(value) if legacy => {
                let encoding = encoding::for_client(&ctx.client, &self.settings.utf8_from);
                let rendered = xml::serialize(&value, encoding.label());
                Ok(SyncResponse::StatusWithPayload {
                    status: SyncStatus::Ok,
                    payload: encoding.encode(&rendered).into_owned(),
                    charset: encoding.label(),
                })
            }
            _ => Ok(SyncResponse::status(SyncStatus::Ok)),
        }
    }

    async fn push(&self, request: SyncRequest, client: ClientInfo) -> AppResult<SyncResponse> {
        if !self.authenticated(&request) {
            return Ok(SyncResponse::status(SyncStatus::Unauthorized));
        }
        let Some(handler) = self.registry.push(&request.request_type) else {
            return Ok(SyncResponse::Empty);
        };

        let ctx = PushContext {
            request_type: request.request_type,
            client,
            params: request.params,
        };
        let payload = match handler.get_data(&ctx).await? {
            Some(payload) if !payload.is_empty() => payload,
            _ => return Ok(SyncResponse::status(SyncStatus::Ok)),
        };

        let stem = archive_stem(&ctx.request_type);
        let members = match payload {
            PushPayload::Document(value) => {
                let encoding = encoding::for_client(&ctx.client, &self.settings.utf8_from);
                let rendered = xml::serialize(&value, encoding.label());
                vec![ArchiveMember::new(
                    format!("{stem}.xml"),
                    encoding.encode(&rendered).into_owned(),
                )]
            }
            PushPayload::Files(members) => members,
        };

        let bytes = tokio::task::spawn_blocking(move || packer::pack_members(&members)).await??;
        let file_name = packer::archive_file_name(&stem, Utc::now());
        info!(request_type = %ctx.request_type, file = %file_name, size = bytes.len(), "Push archive packed");
        Ok(SyncResponse::Archive { file_name, bytes })
    }
}

/// `GetBestellungen_xml` becomes `GetBestellungen`.
pub fn archive_stem(request_type: &str) -> String {
    request_type
        .strip_suffix("_xml")
        .unwrap_or(request_type)
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::{Value, json};
    use shopsync_auth::{PasswordHasher, RpcSessionStore};
    use shopsync_cache::CacheManager;
    use shopsync_core::config::cache::CacheConfig;
    use shopsync_core::config::session::SessionConfig;
    use shopsync_entity::credential::SyncCredential;
    use shopsync_transfer::{UploadDescriptor, UploadErrorCode};

    use super::*;
    use crate::dispatch::registry::{DirectHandler, PullHandler, PushHandler};
    use crate::rpc::RpcAuthenticator;

    #[derive(Debug, Default)]
    struct RecordingPull {
        calls: AtomicUsize,
        seen: Mutex<Vec<PathBuf>>,
        result: Option<Value>,
    }

    #[async_trait]
    impl PullHandler for RecordingPull {
        async fn handle(&self, ctx: &PullContext) -> AppResult<Option<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for file in &ctx.files {
                assert!(file.exists(), "extracted file present during handling");
            }
            self.seen.lock().unwrap().extend(ctx.files.iter().cloned());
            Ok(self.result.clone())
        }
    }

    #[derive(Debug)]
    struct FixedPush(Option<PushPayload>);

    #[async_trait]
    impl PushHandler for FixedPush {
        async fn get_data(&self, _ctx: &PushContext) -> AppResult<Option<PushPayload>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Debug)]
    struct Pong;

    #[async_trait]
    impl DirectHandler for Pong {
        async fn run(&self, _request: &SyncRequest, _client: &ClientInfo) -> AppResult<SyncResponse> {
            Ok(SyncResponse::Text("pong".into()))
        }
    }

    struct Fixture {
        tmp: tempfile::TempDir,
        pull: Arc<RecordingPull>,
        dispatcher: Dispatcher,
    }

    fn fixture(maintenance: bool, pull_result: Option<Value>, push: Option<PushPayload>) -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let hash = PasswordHasher::new().hash_password("secret").unwrap();
        let login = Arc::new(SyncLogin::from_credential(Some(SyncCredential {
            id: 1,
            name: "sync".into(),
            password_hash: hash,
        })));
        let pull = Arc::new(RecordingPull {
            result: pull_result,
            ..Default::default()
        });
        let registry = HandlerRegistry::builder()
            .pull("Artikel_xml", pull.clone())
            .pull(LEGACY_PAYLOAD, pull.clone())
            .pull(RAW_PAYLOAD, pull.clone())
            .push("GetBestellungen_xml", Arc::new(FixedPush(push)))
            .direct(SELF_TEST, Arc::new(Pong))
            .build();
        let sessions = RpcSessionStore::new(
            CacheManager::new(&CacheConfig::default()),
            &SessionConfig::default(),
        );
        let rpc = RpcLayer::new(RpcAuthenticator::new(login.clone(), sessions));
        let settings = DispatchSettings {
            maintenance_mode: maintenance,
            retain_sync_files: false,
            scratch_root: tmp.path().join("sync_tmp"),
            agent_marker: "JTL-Wawi".into(),
            utf8_from: ClientVersion::parse("1.0").unwrap(),
        };
        Fixture {
            dispatcher: Dispatcher::new(login, registry, rpc, settings),
            pull,
            tmp,
        }
    }

    fn zip_upload(dir: &std::path::Path, name: &str, members: &[(&str, &str)]) -> UploadDescriptor {
        let path = dir.join(format!("spool-{name}"));
        let file = std::fs::File::create(&path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for (member, content) in members {
            zip.start_file(*member, zip::write::SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
        raw_upload(&path, name)
    }

    fn raw_upload(path: &std::path::Path, name: &str) -> UploadDescriptor {
        UploadDescriptor {
            original_name: name.into(),
            temp_path: path.to_path_buf(),
            size: std::fs::metadata(path).unwrap().len(),
            error: UploadErrorCode::Ok,
        }
    }

    fn authed(request_type: &str) -> SyncRequest {
        SyncRequest::new(request_type)
            .with_param("userID", "sync")
            .with_param("userPWD", "secret")
    }

    #[tokio::test]
    async fn test_maintenance_comes_before_authentication() {
        let f = fixture(true, None, None);
        let response = f.dispatcher.start(SyncRequest::new("Artikel_xml")).await.unwrap();
        assert!(matches!(response, SyncResponse::Literal(ref m) if m == "maintenance"));
        assert_eq!(f.pull.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_credentials_skip_extraction() {
        let f = fixture(false, None, None);
        let upload = zip_upload(f.tmp.path(), "artikel.zip", &[("artikel.xml", "<a/>")]);
        let request = SyncRequest::new("Artikel_xml")
            .with_param("userID", "sync")
            .with_param("userPWD", "wrong")
            .with_upload(upload);

        let response = f.dispatcher.start(request).await.unwrap();
        assert_eq!(response.status_code(), Some(3));
        assert_eq!(f.pull.calls.load(Ordering::SeqCst), 0);
        assert!(!f.tmp.path().join("sync_tmp").exists());
    }

    #[tokio::test]
    async fn test_happy_pull_invokes_handler_once() {
        let f = fixture(false, None, None);
        let upload = zip_upload(
            f.tmp.path(),
            "artikel.zip",
            &[("artikel.xml", "<a/>"), ("preise.xml", "<p/>")],
        );
        let response = f.dispatcher.start(authed("Artikel_xml").with_upload(upload)).await.unwrap();

        assert_eq!(response.status_code(), Some(0));
        assert_eq!(f.pull.calls.load(Ordering::SeqCst), 1);
        let seen = f.pull.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        // Scratch space is gone once the request finished.
        assert!(seen.iter().all(|p| !p.exists()));
    }

    #[tokio::test]
    async fn test_corrupt_archive_is_status_two() {
        let f = fixture(false, None, None);
        let path = f.tmp.path().join("broken");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        let upload = raw_upload(&path, "artikel.zip");

        let response = f.dispatcher.start(authed("Artikel_xml").with_upload(upload)).await.unwrap();
        assert_eq!(response.status_code(), Some(2));
        assert_eq!(f.pull.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_upload_is_an_error() {
        let f = fixture(false, None, None);
        let err = f.dispatcher.start(authed("Artikel_xml")).await.unwrap_err();
        assert_eq!(err.kind, shopsync_core::error::ErrorKind::Transfer);
    }

    #[tokio::test]
    async fn test_raw_payload_is_not_extracted() {
        let f = fixture(false, None, None);
        let path = f.tmp.path().join("spool-img");
        std::fs::write(&path, b"\x89PNG").unwrap();
        let upload = raw_upload(&path, "bild.png");

        let response = f.dispatcher.start(authed(RAW_PAYLOAD).with_upload(upload)).await.unwrap();
        assert_eq!(response.status_code(), Some(0));
        let seen = f.pull.seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].ends_with("bild.png"));
    }

    #[tokio::test]
    async fn test_legacy_payload_is_encoded_for_old_clients() {
        let f = fixture(false, Some(json!({ "kunde": { "cName": "Müller" } })), None);
        let upload = zip_upload(f.tmp.path(), "kunde.zip", &[("kunde.xml", "<k/>")]);
        let request = authed(LEGACY_PAYLOAD)
            .with_user_agent("JTL-Wawi/0.9")
            .with_upload(upload);

        match f.dispatcher.start(request).await.unwrap() {
            SyncResponse::StatusWithPayload { status, payload, charset } => {
                assert_eq!(status, SyncStatus::Ok);
                assert_eq!(charset, "windows-1252");
                assert!(payload.windows(6).any(|w| w == b"M\xfcller"));
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_push_packs_archive() {
        let f = fixture(false, None, Some(PushPayload::Document(json!({ "bestellung": 1 }))));
        match f.dispatcher.start(authed("GetBestellungen_xml")).await.unwrap() {
            SyncResponse::Archive { file_name, bytes } => {
                assert!(file_name.starts_with("GetBestellungen_"));
                assert!(file_name.ends_with(".zip"));
                let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
                assert_eq!(archive.file_names().collect::<Vec<_>>(), vec!["GetBestellungen.xml"]);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_push_without_data_is_status_zero() {
        let f = fixture(false, None, None);
        let response = f.dispatcher.start(authed("GetBestellungen_xml")).await.unwrap();
        assert_eq!(response.status_code(), Some(0));
    }

    #[tokio::test]
    async fn test_special_and_unknown_identifiers() {
        let f = fixture(false, None, None);
        let response = f.dispatcher.start(authed(SELF_TEST)).await.unwrap();
        assert!(matches!(response, SyncResponse::Text(ref t) if t == "pong"));

        let denied = f.dispatcher.start(SyncRequest::new(SELF_TEST)).await.unwrap();
        assert_eq!(denied.status_code(), Some(3));

        let unregistered = f.dispatcher.start(authed(IMAGE_API)).await.unwrap();
        assert!(matches!(unregistered, SyncResponse::Empty));

        let unknown = f.dispatcher.start(authed("Nonsense")).await.unwrap();
        assert!(matches!(unknown, SyncResponse::Empty));
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem("GetKunden_xml"), "GetKunden");
        assert_eq!(archive_stem("Export"), "Export");
    }
}
