//! Cronjob status, history and trigger over RPC.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use shopsync_core::result::AppResult;
use shopsync_entity::job::{CronjobStatus, JobType};
use shopsync_worker::JobRunner;

use super::codes;
use super::envelope::RpcCode;
use super::handler::{RpcContext, RpcHandler, RpcOutcome};

const HISTORY_LIMIT: i64 = 50;

#[derive(Debug)]
pub struct CronjobRpcHandler {
    runner: Arc<JobRunner>,
}

impl CronjobRpcHandler {
    pub fn new(runner: Arc<JobRunner>) -> Self {
        Self { runner }
    }

    async fn status(&self, token: &str) -> AppResult<RpcOutcome> {
        let interval = self.runner.due_interval();
        let rows = self.runner.ledger().list(Some(JobType::Recurring)).await?;
        let statuses: Vec<CronjobStatus> = rows
            .iter()
            .map(|row| CronjobStatus::from_record(row, interval, self.runner.is_enabled(row.job_kind)))
            .collect();
        Ok(RpcOutcome::ok(token, serde_json::to_value(statuses)?))
    }

    async fn history(&self, ctx: &RpcContext<'_>) -> AppResult<RpcOutcome> {
        let kind = match ctx.request.param("jobs") {
            Some(raw) => match raw.trim().parse::<i32>() {
                Ok(kind) => Some(kind),
                Err(_) => return Ok(RpcOutcome::error(RpcCode::ErrorDeserialize, &ctx.token)),
            },
            None => None,
        };
        let entries = self.runner.ledger().history(kind, HISTORY_LIMIT).await?;
        Ok(RpcOutcome::ok(&ctx.token, serde_json::to_value(entries)?))
    }

    /// `jobs` is a comma separated list of kinds. Triggering only disarms
    /// the rows; the next sweep runs them.
    async fn trigger(&self, ctx: &RpcContext<'_>) -> AppResult<RpcOutcome> {
        let Some(kinds) = ctx.request.param("jobs").and_then(parse_kinds) else {
            return Ok(RpcOutcome::error(RpcCode::ErrorDeserialize, &ctx.token));
        };

        let mut triggered = Vec::new();
        let mut missing = Vec::new();
        for kind in kinds {
            if self.runner.ledger().trigger(kind).await? {
                triggered.push(kind);
            } else {
                missing.push(kind);
            }
        }
        info!(?triggered, ?missing, "Cronjobs triggered over RPC");
        Ok(RpcOutcome::ok(
            &ctx.token,
            json!({ "triggered": triggered, "missing": missing }),
        ))
    }
}

fn parse_kinds(raw: &str) -> Option<Vec<i32>> {
    let kinds: Result<Vec<i32>, _> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect();
    kinds.ok().filter(|k| !k.is_empty())
}

#[async_trait]
impl RpcHandler for CronjobRpcHandler {
    fn route(&self) -> &'static str {
        "cronjob"
    }

    fn identifier(&self) -> &'static str {
        "SyncCronjob"
    }

    async fn handle(&self, ctx: &RpcContext<'_>, request_code: i32) -> AppResult<RpcOutcome> {
        match request_code {
            codes::CRONJOB_STATUS => self.status(&ctx.token).await,
            codes::CRONJOB_HISTORY => self.history(ctx).await,
            codes::CRONJOB_TRIGGER => self.trigger(ctx).await,
            _ => Ok(RpcOutcome::error(RpcCode::Unknown, &ctx.token)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;
    use shopsync_database::memory::{MemoryJobLedger, MemoryShopMaintenance};
    use shopsync_worker::SweepSettings;

    use super::*;
    use crate::rpc::request::RpcRequest;

    async fn handler() -> (CronjobRpcHandler, MemoryJobLedger) {
        let ledger = MemoryJobLedger::seeded().await;
        let settings = SweepSettings {
            scratch_root: std::env::temp_dir().join("shopsync-cronjob-test"),
            retain_sync_files: true,
            scratch_grace: std::time::Duration::ZERO,
            due_interval: chrono::Duration::hours(12),
        };
        let runner = JobRunner::new(
            Arc::new(ledger.clone()),
            Arc::new(MemoryShopMaintenance::new()),
            settings,
        );
        (CronjobRpcHandler::new(Arc::new(runner)), ledger)
    }

    fn request(jobs: Option<&str>) -> RpcRequest {
        let mut params = HashMap::new();
        if let Some(jobs) = jobs {
            params.insert("jobs".to_string(), jobs.to_string());
        }
        RpcRequest {
            params,
            ..Default::default()
        }
    }

    fn data(outcome: RpcOutcome) -> serde_json::Value {
        let envelope = outcome.envelope().cloned().unwrap();
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.token, "tok");
        envelope.data.unwrap()
    }

    #[tokio::test]
    async fn test_status_lists_recurring_jobs() {
        let (handler, _) = handler().await;
        let req = request(None);
        let ctx = RpcContext { token: "tok".into(), request: &req };
        let statuses = data(handler.handle(&ctx, codes::CRONJOB_STATUS).await.unwrap());
        let statuses = statuses.as_array().unwrap();
        assert_eq!(statuses.len(), 4);
        assert_eq!(statuses[0]["kind"], 1);
        assert_eq!(statuses[0]["enabled"], false);
    }

    #[tokio::test]
    async fn test_trigger_disarms_rows() {
        let (handler, ledger) = handler().await;
        ledger.arm_at(2, Some(Utc::now())).await;

        let req = request(Some("2, 99"));
        let ctx = RpcContext { token: "tok".into(), request: &req };
        let result = data(handler.handle(&ctx, codes::CRONJOB_TRIGGER).await.unwrap());
        assert_eq!(result, json!({ "triggered": [2], "missing": [99] }));
        assert!(ledger.recurring(2).await.unwrap().created_at.is_none());
    }

    #[tokio::test]
    async fn test_bad_parameters() {
        let (handler, _) = handler().await;
        for (code, jobs) in [(codes::CRONJOB_TRIGGER, None), (codes::CRONJOB_HISTORY, Some("x"))] {
            let req = request(jobs);
            let ctx = RpcContext { token: "tok".into(), request: &req };
            let outcome = handler.handle(&ctx, code).await.unwrap();
            assert_eq!(outcome.envelope().unwrap().code, RpcCode::ErrorDeserialize.code());
        }

        let req = request(None);
        let ctx = RpcContext { token: "tok".into(), request: &req };
        let outcome = handler.handle(&ctx, codes::UPLOAD_LIST).await.unwrap();
        assert_eq!(outcome.envelope().unwrap().code, -1);
    }

    #[tokio::test]
    async fn test_history_is_empty_initially() {
        let (handler, _) = handler().await;
        let req = request(Some("4"));
        let ctx = RpcContext { token: "tok".into(), request: &req };
        let entries = data(handler.handle(&ctx, codes::CRONJOB_HISTORY).await.unwrap());
        assert_eq!(entries, json!([]));
    }
}
