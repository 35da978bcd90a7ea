//! One-shot job executor, dispatching ledger rows to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use shopsync_core::error::{AppError, ErrorKind};
use shopsync_entity::job::JobRecord;

/// Handler for one-shot ledger rows, resolved by the row's `name`.
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// Registry name matched against `job_ledger.name`.
    fn name(&self) -> &str;

    /// Run the job. The returned value is stored as the history summary.
    async fn execute(&self, job: &JobRecord) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from a job or recurring action.
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    #[error("Job failed: {0}")]
    Failed(String),

    #[error("Job timed out after {0} seconds")]
    TimedOut(u64),

    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl From<JobExecutionError> for AppError {
    fn from(err: JobExecutionError) -> Self {
        match err {
            JobExecutionError::Internal(inner) => inner,
            other => {
                let message = other.to_string();
                AppError::with_source(ErrorKind::Job, message, other)
            }
        }
    }
}

/// Registry of one-shot handlers.
#[derive(Debug, Default)]
pub struct JobExecutor {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let name = handler.name().to_string();
        tracing::info!(name = %name, "Registered one-shot job handler");
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn JobHandler>> {
        self.handlers.get(name)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
