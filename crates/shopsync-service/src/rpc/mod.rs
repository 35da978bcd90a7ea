//! Secondary RPC protocol: form requests answered with a JSON envelope
//! or a one-shot file download.

pub mod auth;
pub mod cronjob;
pub mod envelope;
pub mod handler;
pub mod request;
pub mod uploads;

pub use auth::RpcAuthenticator;
pub use cronjob::CronjobRpcHandler;
pub use envelope::{RpcCode, RpcEnvelope};
pub use handler::{FileDownload, RpcContext, RpcHandler, RpcLayer, RpcOutcome};
pub use request::RpcRequest;
pub use uploads::UploadRpcHandler;

/// Request codes understood by the built-in handlers.
pub mod codes {
    pub const UPLOAD_LIST: i32 = 1;
    pub const UPLOAD_FILE_DATA: i32 = 2;
    pub const UPLOAD_FOLDER_TREE: i32 = 3;
    pub const UPLOAD_FOLDER_FILES: i32 = 4;
    pub const CRONJOB_STATUS: i32 = 5;
    pub const CRONJOB_HISTORY: i32 = 6;
    pub const CRONJOB_TRIGGER: i32 = 7;
}
