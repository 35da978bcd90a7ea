//! RPC session management.

pub mod store;

pub use store::{RpcSession, RpcSessionStore};
