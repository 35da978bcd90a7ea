//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use shopsync_core::config::AppConfig;
use shopsync_service::Dispatcher;
use shopsync_worker::JobRunner;

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dispatcher: Arc<Dispatcher>,
    /// Shared with the cron scheduler.
    pub runner: Arc<JobRunner>,
}
