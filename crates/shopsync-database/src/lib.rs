//! # shopsync-database
//!
//! PostgreSQL connection management, the storage traits the gateway is
//! written against, and their Postgres and in-memory implementations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{CredentialStore, JobLedger, ShopMaintenance};
