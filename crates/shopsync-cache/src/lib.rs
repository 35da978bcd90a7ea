//! # shopsync-cache
//!
//! In-process cache provider built on [moka](https://crates.io/crates/moka),
//! wrapped by [`CacheManager`] so callers only see the
//! [`CacheProvider`](shopsync_core::traits::CacheProvider) trait.

pub mod keys;
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
