//! Trait seams shared across crates.

pub mod cache;

pub use cache::CacheProvider;
