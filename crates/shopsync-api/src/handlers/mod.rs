//! HTTP handlers.

pub mod health;
pub mod rpc;
pub mod sync;
