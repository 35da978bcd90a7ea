//! RPC handler trait and the layer routing to it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info, warn};

use shopsync_core::result::AppResult;

use super::auth::RpcAuthenticator;
use super::envelope::{RpcCode, RpcEnvelope};
use super::request::RpcRequest;

/// A file handed to the client once and deleted afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDownload {
    pub path: PathBuf,
    pub file_name: String,
}

/// What an RPC request ends with. The transport writes it and stops.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    Envelope(RpcEnvelope),
    FileDownload(FileDownload),
}

impl RpcOutcome {
    pub fn ok(token: &str, data: serde_json::Value) -> Self {
        Self::Envelope(RpcEnvelope::ok(token, data))
    }

    pub fn error(code: RpcCode, token: &str) -> Self {
        Self::Envelope(RpcEnvelope::error(code, token))
    }

    pub fn envelope(&self) -> Option<&RpcEnvelope> {
        match self {
            Self::Envelope(envelope) => Some(envelope),
            Self::FileDownload(_) => None,
        }
    }
}

/// Authenticated request as seen by a handler.
#[derive(Debug)]
pub struct RpcContext<'a> {
    pub token: String,
    pub request: &'a RpcRequest,
}

#[async_trait]
pub trait RpcHandler: Send + Sync + std::fmt::Debug + 'static {
    /// Route segment under `/sync/rpc/`.
    fn route(&self) -> &'static str;

    /// Sync request type routed to this handler.
    fn identifier(&self) -> &'static str;

    async fn handle(&self, ctx: &RpcContext<'_>, request_code: i32) -> AppResult<RpcOutcome>;
}

#[derive(Debug, Clone)]
pub struct RpcLayer {
    auth: RpcAuthenticator,
    handlers: HashMap<&'static str, Arc<dyn RpcHandler>>,
}

impl RpcLayer {
    pub fn new(auth: RpcAuthenticator) -> Self {
        Self {
            auth,
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn RpcHandler>) {
        info!(identifier = handler.identifier(), route = handler.route(), "Registered RPC handler");
        self.handlers.insert(handler.identifier(), handler);
    }

    pub fn handles(&self, identifier: &str) -> bool {
        self.handlers.contains_key(identifier)
    }

    /// Sync request type for a `/sync/rpc/{route}` segment.
    pub fn identifier_for_route(&self, route: &str) -> Option<&'static str> {
        self.handlers
            .values()
            .find(|h| h.route() == route)
            .map(|h| h.identifier())
    }

    /// Authenticate and run the handler registered for `identifier`.
    ///
    /// Handler errors are logged and answered with `ERRORINTERNAL`.
    pub async fn dispatch(&self, identifier: &str, request: &RpcRequest) -> AppResult<RpcOutcome> {
        let Some(handler) = self.handlers.get(identifier) else {
            return Ok(RpcOutcome::error(RpcCode::Unknown, ""));
        };

        let Some(token) = self.auth.authenticate(request).await? else {
            return Ok(RpcOutcome::Envelope(RpcEnvelope::login_failed()));
        };

        let Some(code) = request.code else {
            warn!(identifier, "RPC request without a valid request code");
            return Ok(RpcOutcome::error(RpcCode::Unknown, &token));
        };

        let ctx = RpcContext {
            token,
            request,
        };
        match handler.handle(&ctx, code).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!(identifier, code, error = %e, "RPC handler failed");
                Ok(RpcOutcome::error(RpcCode::ErrorInternal, &ctx.token))
            }
        }
    }
}
