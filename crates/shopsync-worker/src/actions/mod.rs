//! Recurring maintenance actions dispatched by job kind.

pub mod command;
pub mod garbage;

use async_trait::async_trait;

use shopsync_entity::job::{JobKind, JobRecord};

use crate::executor::JobExecutionError;

pub use command::{CommandAction, CommandJob};
pub use garbage::GarbageCollector;

/// An action bound to one recurring job kind.
#[async_trait]
pub trait RecurringAction: Send + Sync + std::fmt::Debug {
    fn kind(&self) -> JobKind;

    /// Feature flag. A disabled action is skipped and its row stays due.
    fn enabled(&self) -> bool;

    /// Run once. Must tolerate being run again for the same due period.
    /// Returns a short summary for the job history.
    async fn run(&self, job: &JobRecord) -> Result<Option<String>, JobExecutionError>;
}
