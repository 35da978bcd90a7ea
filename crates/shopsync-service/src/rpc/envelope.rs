//! JSON response envelope.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response codes of the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcCode {
    Unknown,
    Ok,
    ErrorLogin,
    ErrorDeserialize,
    FolderNotExists,
    ErrorInternal,
}

impl RpcCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Ok => 0,
            Self::ErrorLogin => 1,
            Self::ErrorDeserialize => 2,
            Self::FolderNotExists => 3,
            Self::ErrorInternal => 4,
        }
    }
}

/// `data` is only present when `code` is OK.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub code: i32,
    pub token: String,
    pub data: Option<Value>,
}

impl RpcEnvelope {
    pub fn ok(token: impl Into<String>, data: Value) -> Self {
        Self {
            code: RpcCode::Ok.code(),
            token: token.into(),
            data: Some(data),
        }
    }

    pub fn error(code: RpcCode, token: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            token: token.into(),
            data: None,
        }
    }

    pub fn login_failed() -> Self {
        Self::error(RpcCode::ErrorLogin, "")
    }
}
