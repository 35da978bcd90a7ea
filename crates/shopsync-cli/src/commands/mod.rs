//! CLI command definitions and dispatch.

pub mod config;
pub mod credential;
pub mod jobs;
pub mod migrate;

use clap::{Parser, Subcommand};

use shopsync_core::config::AppConfig;
use shopsync_core::error::AppError;
use shopsync_database::DatabasePool;

use crate::output::OutputFormat;

/// ShopSync: ERP synchronization gateway administration
#[derive(Debug, Parser)]
#[command(name = "shopsync", version, about, long_about = None)]
pub struct Cli {
    /// Directory holding default.toml and the environment overlays
    #[arg(short, long, default_value = "config")]
    pub config: String,

    /// Environment overlay to load
    #[arg(short, long, env = "SHOPSYNC_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Sync credential management
    Credential(credential::CredentialArgs),
    /// Job ledger management
    Jobs(jobs::JobsArgs),
    /// Configuration inspection
    Config(config::ConfigArgs),
}

impl Cli {
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Credential(args) => credential::execute(args, &config).await,
            Commands::Jobs(args) => jobs::execute(args, &config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: load configuration from the config directory
pub fn load_config(dir: &str, env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_from(dir, env)
}

/// Helper: connect to the configured database
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: map a prompt failure
pub(crate) fn input_error(e: dialoguer::Error) -> AppError {
    AppError::internal(format!("Input error: {e}"))
}
