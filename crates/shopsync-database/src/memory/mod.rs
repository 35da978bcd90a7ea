//! In-memory storage implementations using Tokio mutexes.
//!
//! Suitable for single-node deployments without a database and for tests.

pub mod credential;
pub mod ledger;
pub mod shop;

pub use credential::MemoryCredentialStore;
pub use ledger::MemoryJobLedger;
pub use shop::MemoryShopMaintenance;
