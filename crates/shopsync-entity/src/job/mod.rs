//! Job ledger domain entities.

pub mod history;
pub mod kind;
pub mod model;

pub use history::{CronjobStatus, JobHistoryEntry};
pub use kind::{JobKind, JobType};
pub use model::{JobRecord, NewOneShotJob};
