//! Values produced by the dispatcher and rendered by the transport.

use crate::rpc::RpcOutcome;

/// Body of every response while maintenance mode is on.
pub const MAINTENANCE_MARKER: &str = "maintenance";

/// Status line values of the sync protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Ok,
    /// The uploaded archive could not be unpacked.
    ArchiveFailed,
    Unauthorized,
}

impl SyncStatus {
    pub fn code(&self) -> u8 {
        match self {
            Self::Ok => 0,
            Self::ArchiveFailed => 2,
            Self::Unauthorized => 3,
        }
    }

    pub fn line(&self) -> String {
        self.code().to_string()
    }
}

/// Outcome of one dispatched request.
#[derive(Debug)]
pub enum SyncResponse {
    /// Status line only.
    Status(SyncStatus),
    /// Status line followed by an encoded payload line.
    StatusWithPayload {
        status: SyncStatus,
        payload: Vec<u8>,
        charset: &'static str,
    },
    /// Packed push data streamed as a download.
    Archive { file_name: String, bytes: Vec<u8> },
    /// Fixed body written verbatim.
    Literal(String),
    /// Free-form text from a direct handler.
    Text(String),
    /// Unknown request type: nothing is written.
    Empty,
    Rpc(RpcOutcome),
}

impl SyncResponse {
    pub fn status(status: SyncStatus) -> Self {
        Self::Status(status)
    }

    pub fn maintenance() -> Self {
        Self::Literal(MAINTENANCE_MARKER.to_string())
    }

    /// The status line, when the response carries one.
    pub fn status_code(&self) -> Option<u8> {
        match self {
            Self::Status(status) | Self::StatusWithPayload { status, .. } => Some(status.code()),
            _ => None,
        }
    }
}
