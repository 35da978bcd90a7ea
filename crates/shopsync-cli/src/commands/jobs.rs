//! Job ledger commands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;
use tabled::Tabled;

use shopsync_api::{GatewayStores, build_runner};
use shopsync_core::config::AppConfig;
use shopsync_core::error::AppError;
use shopsync_database::repositories::credential::CredentialRepository;
use shopsync_database::repositories::job::JobRepository;
use shopsync_database::repositories::shop::ShopRepository;
use shopsync_database::store::JobLedger;
use shopsync_entity::job::{JobHistoryEntry, JobKind, JobRecord, JobType, NewOneShotJob};

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct JobsArgs {
    #[command(subcommand)]
    pub command: JobsCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum JobTypeArg {
    /// One-shot rows
    Std,
    /// Recurring rows
    Rpt,
}

impl From<JobTypeArg> for JobType {
    fn from(arg: JobTypeArg) -> Self {
        match arg {
            JobTypeArg::Std => JobType::OneShot,
            JobTypeArg::Rpt => JobType::Recurring,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum JobsCommand {
    /// List ledger rows
    List {
        #[arg(short = 't', long = "type", value_enum)]
        job_type: Option<JobTypeArg>,
    },
    /// Queue a one-shot job for the next sweep but one
    Enqueue {
        /// Registered one-shot handler name
        name: String,
        #[arg(short, long)]
        label: Option<String>,
        #[arg(short, long, default_value_t = 0)]
        kind: i32,
    },
    /// Make a recurring job due immediately
    Trigger {
        /// Job kind (1 review reminders, 2 sitemap, 3 RSS, 4 garbage collection)
        kind: i32,
    },
    /// Run one maintenance sweep now
    Sweep,
    /// Show recent job history
    History {
        #[arg(short, long)]
        kind: Option<i32>,
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct JobRow {
    id: i64,
    #[tabled(rename = "type")]
    job_type: String,
    kind: String,
    name: String,
    label: String,
    counter: i32,
    armed: String,
    finished: bool,
}

impl From<&JobRecord> for JobRow {
    fn from(job: &JobRecord) -> Self {
        Self {
            id: job.id,
            job_type: job.job_type.to_string(),
            kind: job.kind().to_string(),
            name: job.name.clone(),
            label: job.label.clone(),
            counter: job.counter,
            armed: format_time(job.created_at),
            finished: job.finished,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    job_id: i64,
    kind: String,
    label: String,
    finished_at: String,
    summary: String,
}

impl From<&JobHistoryEntry> for HistoryRow {
    fn from(entry: &JobHistoryEntry) -> Self {
        Self {
            job_id: entry.job_id,
            kind: JobKind::from_code(entry.job_kind).to_string(),
            label: entry.label.clone(),
            finished_at: format_time(Some(entry.finished_at)),
            summary: entry.summary.clone().unwrap_or_default(),
        }
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn execute(args: &JobsArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let db = super::create_db_pool(config).await?;
    let ledger = JobRepository::new(db.pool().clone());

    match &args.command {
        JobsCommand::List { job_type } => {
            let rows = ledger.list(job_type.map(JobType::from)).await?;
            let rows: Vec<JobRow> = rows.iter().map(JobRow::from).collect();
            output::print_list(&rows, format);
        }
        JobsCommand::Enqueue { name, label, kind } => {
            if !config.jobs.one_shot_commands.contains_key(name) {
                output::print_warning(&format!(
                    "No one-shot command named '{name}' is configured; the sweep will drop this row."
                ));
            }
            let job = ledger
                .enqueue_one_shot(&NewOneShotJob {
                    name: name.clone(),
                    label: label.clone().unwrap_or_else(|| name.clone()),
                    job_kind: *kind,
                })
                .await?;
            output::print_success(&format!("One-shot job '{}' queued (id: {})", job.name, job.id));
        }
        JobsCommand::Trigger { kind } => {
            if !ledger.trigger(*kind).await? {
                return Err(AppError::not_found(format!("No recurring job of kind {kind}")));
            }
            output::print_success(&format!(
                "{} is due with the next sweep.",
                JobKind::from_code(*kind)
            ));
        }
        JobsCommand::Sweep => {
            let pool = db.pool().clone();
            let stores = GatewayStores {
                credentials: Arc::new(CredentialRepository::new(pool.clone())),
                ledger: Arc::new(JobRepository::new(pool.clone())),
                shop: Arc::new(ShopRepository::new(pool)),
            };
            let report = build_runner(config, &stores).execute().await?;
            output::print_success("Sweep finished.");
            output::print_kv("Scratch entries removed", &report.scratch_removed.to_string());
            output::print_kv("Manufacturers changed", &report.manufacturers_changed.to_string());
            output::print_kv("One-shots marked", &report.one_shots_marked.to_string());
            output::print_kv("One-shots run", &report.one_shots_run.to_string());
            output::print_kv("One-shots dropped", &report.one_shots_dropped.to_string());
            output::print_kv("Recurring run", &report.recurring_run.to_string());
            output::print_kv("Recurring skipped", &report.recurring_skipped.to_string());
        }
        JobsCommand::History { kind, limit } => {
            let entries = ledger.history(*kind, *limit).await?;
            let rows: Vec<HistoryRow> = entries.iter().map(HistoryRow::from).collect();
            output::print_list(&rows, format);
        }
    }

    db.close().await;
    Ok(())
}
