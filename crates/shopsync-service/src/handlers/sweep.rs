//! `LastJobs`: run a maintenance sweep on request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use shopsync_core::result::AppResult;
use shopsync_worker::JobRunner;

use crate::dispatch::{ClientInfo, DirectHandler, SyncRequest, SyncResponse, SyncStatus};

#[derive(Debug)]
pub struct JobSweepHandler {
    runner: Arc<JobRunner>,
}

impl JobSweepHandler {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DirectHandler for JobSweepHandler {
    async fn run(&self, _request: &SyncRequest, _client: &ClientInfo) -> AppResult<SyncResponse> {
        let report = self.runner.execute().await?;
        info!(?report, "Sweep requested by client finished");
        Ok(SyncResponse::status(SyncStatus::Ok))
    }
}
