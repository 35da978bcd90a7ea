//! # shopsync-service
//!
//! Protocol logic of the ERP gateway, independent of HTTP:
//!
//! - `dispatch`: the sync dispatcher routing a request type to pull,
//!   push, direct or RPC handling
//! - `rpc`: the token-authenticated JSON envelope protocol
//! - `handlers`: built-in handlers staging payloads through the
//!   filesystem and triggering sweeps

pub mod dispatch;
pub mod handlers;
pub mod rpc;

pub use dispatch::{Dispatcher, HandlerRegistry, SyncRequest, SyncResponse};
pub use rpc::{RpcLayer, RpcOutcome};
