//! Configuration inspection commands.

use clap::{Args, Subcommand};

use shopsync_core::config::AppConfig;
use shopsync_core::error::AppError;
use shopsync_database::connection::mask_password;

use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

pub fn execute(args: &ConfigArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            match format {
                OutputFormat::Json => output::print_item(&shown, format),
                OutputFormat::Table => {
                    output::print_kv("Server", &format!("{}:{}", shown.server.host, shown.server.port));
                    output::print_kv("Database", &shown.database.url);
                    output::print_kv("Data root", &shown.storage.data_root);
                    output::print_kv("Maintenance mode", &shown.gateway.maintenance_mode.to_string());
                    output::print_kv("Retain sync files", &shown.gateway.retain_sync_files.to_string());
                    output::print_kv("Display errors", &shown.gateway.display_errors.to_string());
                    output::print_kv("Due interval (h)", &shown.jobs.due_interval_hours.to_string());
                    output::print_kv(
                        "Sweep schedule",
                        shown.jobs.schedule.as_deref().unwrap_or("request driven only"),
                    );
                    output::print_kv("Pull identifiers", &shown.gateway.pull_identifiers.join(", "));
                    output::print_kv("Push identifiers", &shown.gateway.push_identifiers.join(", "));
                    if shown.gateway.maintenance_mode {
                        output::print_warning("Maintenance mode is on: every sync request is refused.");
                    }
                }
            }
        }
    }
    Ok(())
}
