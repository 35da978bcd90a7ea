//! # shopsync-entity
//!
//! Domain entity models for the ShopSync gateway. Database entities derive
//! `sqlx::FromRow`; filesystem snapshots are plain value objects.

pub mod credential;
pub mod job;
pub mod system;
