//! Job ledger processing for ShopSync.
//!
//! This crate provides:
//! - A one-shot job executor dispatching ledger rows by name
//! - Recurring maintenance actions keyed by job kind
//! - The sweep runner invoked by sync requests and the cron scheduler
//! - Hooks that may add rows to a sweep's due set

pub mod actions;
pub mod executor;
pub mod hooks;
pub mod runner;
pub mod scheduler;

pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use runner::{JobRunner, SweepReport, SweepSettings};
pub use scheduler::CronScheduler;
