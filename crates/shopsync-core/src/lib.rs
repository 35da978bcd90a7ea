//! # shopsync-core
//!
//! Core crate for the ShopSync ERP gateway. Contains the configuration
//! schemas, the cache provider trait and the unified error system.
//!
//! This crate has **no** internal dependencies on other ShopSync crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
