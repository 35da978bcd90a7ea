//! Sync request dispatch.

pub mod client;
pub mod context;
pub mod encoding;
pub mod registry;
pub mod response;
pub mod starter;
pub mod xml;

pub use client::{ClientInfo, ClientVersion};
pub use context::{Credentials, PullContext, PushContext, SyncRequest};
pub use encoding::{ResponseEncoding, Utf8Encoding, Windows1252Encoding};
pub use registry::{DirectHandler, HandlerRegistry, PullHandler, PushHandler, PushPayload};
pub use response::{SyncResponse, SyncStatus};
pub use starter::{DispatchSettings, Dispatcher};
