//! Delivers XML documents an external exporter drops into the outbox.
//!
//! Every `*.xml` file in `<outbox>/<request type>/` goes into the push
//! archive and is moved to `sent/` right after it was read. A client that
//! loses the response does not get the files again.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use shopsync_core::result::AppResult;
use shopsync_transfer::packer::ArchiveMember;

use crate::dispatch::{PushContext, PushHandler, PushPayload};

const SENT_DIR: &str = "sent";

#[derive(Debug, Clone)]
pub struct OutboxPushHandler {
    outbox_root: PathBuf,
}

impl OutboxPushHandler {
    pub fn new(outbox_root: impl Into<PathBuf>) -> Self {
        Self {
            outbox_root: outbox_root.into(),
        }
    }
}

async fn pending_documents(dir: &Path) -> AppResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut documents = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_xml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"));
        if is_xml && entry.file_type().await?.is_file() {
            documents.push(path);
        }
    }
    documents.sort();
    Ok(documents)
}

#[async_trait]
impl PushHandler for OutboxPushHandler {
    async fn get_data(&self, ctx: &PushContext) -> AppResult<Option<PushPayload>> {
        let dir = self.outbox_root.join(&ctx.request_type);
        let documents = pending_documents(&dir).await?;
        if documents.is_empty() {
            return Ok(None);
        }

        let sent = dir.join(SENT_DIR);
        tokio::fs::create_dir_all(&sent).await?;

        let mut members = Vec::with_capacity(documents.len());
        for path in documents {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let content = tokio::fs::read(&path).await?;
            tokio::fs::rename(&path, sent.join(&name)).await?;
            members.push(ArchiveMember::new(name, content));
        }

        info!(request_type = %ctx.request_type, documents = members.len(), "Outbox documents delivered");
        Ok(Some(PushPayload::Files(members)))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::dispatch::ClientInfo;

    fn ctx(request_type: &str) -> PushContext {
        PushContext {
            request_type: request_type.into(),
            client: ClientInfo::default(),
            params: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_documents_are_delivered_once() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("GetBestellungen_xml");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("b.xml"), b"<b/>").unwrap();
        std::fs::write(dir.join("a.XML"), b"<a/>").unwrap();
        std::fs::write(dir.join("notes.txt"), b"skip").unwrap();

        let handler = OutboxPushHandler::new(tmp.path());
        let Some(PushPayload::Files(members)) = handler.get_data(&ctx("GetBestellungen_xml")).await.unwrap() else {
            panic!("expected files");
        };
        let names: Vec<_> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a.XML", "b.xml"]);
        assert!(dir.join("sent/b.xml").exists());
        assert!(dir.join("notes.txt").exists());

        assert!(handler.get_data(&ctx("GetBestellungen_xml")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_outbox_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let handler = OutboxPushHandler::new(tmp.path());
        assert!(handler.get_data(&ctx("GetKunden_xml")).await.unwrap().is_none());
    }
}
