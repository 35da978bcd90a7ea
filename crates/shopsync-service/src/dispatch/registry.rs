//! Handler traits and the immutable identifier tables.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use shopsync_core::result::AppResult;
use shopsync_transfer::packer::ArchiveMember;

use super::client::ClientInfo;
use super::context::{PullContext, PushContext, SyncRequest};
use super::response::SyncResponse;

/// Imports the payload of a pull request.
#[async_trait]
pub trait PullHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Called once per request with every extracted file. The returned
    /// value is only rendered for the legacy payload identifier.
    async fn handle(&self, ctx: &PullContext) -> AppResult<Option<Value>>;
}

/// Data returned by a push handler.
#[derive(Debug, Clone)]
pub enum PushPayload {
    /// Serialized as key/value XML into a single `<stem>.xml` member.
    Document(Value),
    /// Packed as given.
    Files(Vec<ArchiveMember>),
}

impl PushPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Document(value) => value.is_null(),
            Self::Files(members) => members.is_empty(),
        }
    }
}

/// Exports data for a push request.
#[async_trait]
pub trait PushHandler: Send + Sync + std::fmt::Debug + 'static {
    /// `None` when there is nothing to deliver.
    async fn get_data(&self, ctx: &PushContext) -> AppResult<Option<PushPayload>>;
}

/// Runs a special identifier directly after authentication.
#[async_trait]
pub trait DirectHandler: Send + Sync + std::fmt::Debug + 'static {
    async fn run(&self, request: &SyncRequest, client: &ClientInfo) -> AppResult<SyncResponse>;
}

/// Identifier tables, fixed once the gateway starts.
#[derive(Debug, Clone, Default)]
pub struct HandlerRegistry {
    pull: HashMap<String, Arc<dyn PullHandler>>,
    push: HashMap<String, Arc<dyn PushHandler>>,
    direct: HashMap<String, Arc<dyn DirectHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    pub fn pull(&self, request_type: &str) -> Option<&Arc<dyn PullHandler>> {
        self.pull.get(request_type)
    }

    pub fn push(&self, request_type: &str) -> Option<&Arc<dyn PushHandler>> {
        self.push.get(request_type)
    }

    pub fn direct(&self, request_type: &str) -> Option<&Arc<dyn DirectHandler>> {
        self.direct.get(request_type)
    }

    pub fn len(&self) -> usize {
        self.pull.len() + self.push.len() + self.direct.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct HandlerRegistryBuilder {
    registry: HandlerRegistry,
}

impl HandlerRegistryBuilder {
    pub fn pull(mut self, request_type: impl Into<String>, handler: Arc<dyn PullHandler>) -> Self {
        self.registry.pull.insert(request_type.into(), handler);
        self
    }

    pub fn push(mut self, request_type: impl Into<String>, handler: Arc<dyn PushHandler>) -> Self {
        self.registry.push.insert(request_type.into(), handler);
        self
    }

    pub fn direct(mut self, request_type: impl Into<String>, handler: Arc<dyn DirectHandler>) -> Self {
        self.registry.direct.insert(request_type.into(), handler);
        self
    }

    pub fn build(self) -> HandlerRegistry {
        self.registry
    }
}
