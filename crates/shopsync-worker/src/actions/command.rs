//! Recurring action delegated to an external program.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::process::Command;
use tracing::{info, warn};

use shopsync_core::config::jobs::CommandSpec;
use shopsync_entity::job::{JobKind, JobRecord};

use super::RecurringAction;
use crate::executor::{JobExecutionError, JobHandler};

/// Runs a configured program, e.g. the storefront's sitemap exporter.
#[derive(Debug, Clone)]
pub struct CommandAction {
    kind: JobKind,
    enabled: bool,
    spec: Option<CommandSpec>,
}

impl CommandAction {
    /// An enabled flag without a bound program leaves the action disabled.
    pub fn new(kind: JobKind, flag: bool, spec: Option<CommandSpec>) -> Self {
        if flag && spec.is_none() {
            warn!(kind = %kind, "Job enabled but no command configured, leaving it disabled");
        }
        Self {
            kind,
            enabled: flag && spec.is_some(),
            spec,
        }
    }
}

#[async_trait]
impl RecurringAction for CommandAction {
    fn kind(&self) -> JobKind {
        self.kind
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    async fn run(&self, job: &JobRecord) -> Result<Option<String>, JobExecutionError> {
        let Some(spec) = &self.spec else {
            return Ok(None);
        };
        info!(kind = %self.kind, program = %spec.program, "Running job command");
        run_command(spec, job).await
    }
}

/// One-shot ledger row bound to an external program by name.
#[derive(Debug, Clone)]
pub struct CommandJob {
    name: String,
    spec: CommandSpec,
}

impl CommandJob {
    pub fn new(name: impl Into<String>, spec: CommandSpec) -> Self {
        Self {
            name: name.into(),
            spec,
        }
    }
}

#[async_trait]
impl JobHandler for CommandJob {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, job: &JobRecord) -> Result<Option<Value>, JobExecutionError> {
        info!(name = %self.name, program = %self.spec.program, "Running one-shot command");
        let summary = run_command(&self.spec, job).await?;
        Ok(summary.map(Value::String))
    }
}

/// Run `spec` for `job`. The last non-empty stdout line is the summary.
async fn run_command(spec: &CommandSpec, job: &JobRecord) -> Result<Option<String>, JobExecutionError> {
    let child = Command::new(&spec.program)
        .args(&spec.args)
        .env("SHOPSYNC_JOB_ID", job.id.to_string())
        .env("SHOPSYNC_JOB_KIND", job.job_kind.to_string())
        .env("SHOPSYNC_JOB_NAME", &job.name)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(Duration::from_secs(spec.timeout_seconds), child)
        .await
        .map_err(|_| JobExecutionError::TimedOut(spec.timeout_seconds))?
        .map_err(|e| JobExecutionError::Failed(format!("cannot start {}: {e}", spec.program)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(JobExecutionError::Failed(format!(
            "{} exited with {}: {}",
            spec.program,
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let summary = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string();
    Ok((!summary.is_empty()).then_some(summary))
}
