//! Parsed RPC request.

use std::collections::HashMap;

use crate::dispatch::SyncRequest;

#[derive(Debug, Clone, Default)]
pub struct RpcRequest {
    /// Value of the `e` field, if it parsed as an integer.
    pub code: Option<i32>,
    pub params: HashMap<String, String>,
    pub user_agent: Option<String>,
}

impl RpcRequest {
    pub fn from_sync(request: &SyncRequest) -> Self {
        Self {
            code: request.param("e").and_then(|e| e.trim().parse().ok()),
            params: request.params.clone(),
            user_agent: request.user_agent.clone(),
        }
    }

    /// Non-empty form field.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn token(&self) -> Option<&str> {
        self.param("token")
    }

    /// Credentials as sent, not yet decoded. `uid`/`upwd` first, then the
    /// pair the sync endpoint reads (`userID`/`userPWD`, legacy `uID`/`uPWD`).
    pub fn raw_credentials(&self) -> Option<(&str, &str)> {
        let username = self
            .param("uid")
            .or_else(|| self.param("userID"))
            .or_else(|| self.param("uID"))?;
        let password = self
            .param("upwd")
            .or_else(|| self.param("userPWD"))
            .or_else(|| self.param("uPWD"))?;
        Some((username, password))
    }
}
