//! # shopsync-auth
//!
//! Authentication for the ERP gateway.
//!
//! - `password`: Argon2id hashing and verification
//! - `credential`: the single sync login the ERP client presents
//! - `session`: cache-backed sessions of the secondary RPC protocol

pub mod credential;
pub mod password;
pub mod session;

pub use credential::SyncLogin;
pub use password::PasswordHasher;
pub use session::{RpcSession, RpcSessionStore};
