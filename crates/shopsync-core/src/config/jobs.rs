//! Job ledger and scheduler configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Settings for the maintenance sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobsConfig {
    /// Hours after which a recurring job is due again.
    #[serde(default = "default_due_interval")]
    pub due_interval_hours: i64,
    /// Scratch entries younger than this survive a sweep's purge.
    /// `0` purges everything.
    #[serde(default = "default_scratch_grace")]
    pub scratch_grace_minutes: u64,
    /// Optional cron expression running the sweep independently of
    /// inbound requests.
    #[serde(default)]
    pub schedule: Option<String>,
    /// Days of job history kept by the garbage collector.
    #[serde(default = "default_history_retention")]
    pub history_retention_days: i64,
    /// Per-job feature flags.
    #[serde(default)]
    pub features: JobFeatures,
    /// External programs bound to recurring job kinds.
    #[serde(default)]
    pub commands: JobCommands,
    /// External programs run for one-shot rows, keyed by row name.
    #[serde(default)]
    pub one_shot_commands: BTreeMap<String, CommandSpec>,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            due_interval_hours: default_due_interval(),
            scratch_grace_minutes: default_scratch_grace(),
            schedule: None,
            history_retention_days: default_history_retention(),
            features: JobFeatures::default(),
            commands: JobCommands::default(),
            one_shot_commands: BTreeMap::new(),
        }
    }
}

/// Feature flags gating the recurring actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobFeatures {
    #[serde(default)]
    pub review_reminders: bool,
    #[serde(default)]
    pub sitemap_export: bool,
    #[serde(default)]
    pub rss_export: bool,
    #[serde(default = "default_true")]
    pub garbage_collection: bool,
}

impl Default for JobFeatures {
    fn default() -> Self {
        Self {
            review_reminders: false,
            sitemap_export: false,
            rss_export: false,
            garbage_collection: true,
        }
    }
}

/// Command bindings for actions implemented outside the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobCommands {
    #[serde(default)]
    pub review_reminders: Option<CommandSpec>,
    #[serde(default)]
    pub sitemap_export: Option<CommandSpec>,
    #[serde(default)]
    pub rss_export: Option<CommandSpec>,
}

/// An external program invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_command_timeout")]
    pub timeout_seconds: u64,
}

fn default_due_interval() -> i64 {
    12
}

fn default_scratch_grace() -> u64 {
    30
}

fn default_history_retention() -> i64 {
    30
}

fn default_command_timeout() -> u64 {
    600
}

fn default_true() -> bool {
    true
}
