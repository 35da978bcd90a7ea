//! Sync credential commands.

use clap::{Args, Subcommand};
use validator::Validate;

use shopsync_auth::{PasswordHasher, SyncLogin};
use shopsync_core::config::AppConfig;
use shopsync_core::error::AppError;
use shopsync_database::repositories::credential::CredentialRepository;
use shopsync_database::store::CredentialStore;

use super::input_error;
use crate::output;

#[derive(Debug, Args)]
pub struct CredentialArgs {
    #[command(subcommand)]
    pub command: CredentialCommand,
}

#[derive(Debug, Subcommand)]
pub enum CredentialCommand {
    /// Replace the sync login the ERP client uses
    Set {
        /// Login name (will prompt if not provided)
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Verify a username/password pair against the stored login
    Check {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: Option<String>,
    },
}

/// New login as entered on the command line.
#[derive(Debug, Validate)]
struct NewCredential {
    #[validate(length(min = 1, max = 255, message = "login name must be 1 to 255 characters"))]
    username: String,
    #[validate(length(min = 8, message = "password must have at least 8 characters"))]
    password: String,
}

pub async fn execute(args: &CredentialArgs, config: &AppConfig) -> Result<(), AppError> {
    let db = super::create_db_pool(config).await?;
    let repo = CredentialRepository::new(db.pool().clone());

    match &args.command {
        CredentialCommand::Set { username, password } => {
            let input = NewCredential {
                username: prompt_username(username)?,
                password: match password {
                    Some(p) => p.clone(),
                    None => dialoguer::Password::new()
                        .with_prompt("Sync password")
                        .with_confirmation("Confirm password", "Passwords do not match")
                        .interact()
                        .map_err(input_error)?,
                },
            };
            input
                .validate()
                .map_err(|e| AppError::validation(format!("Invalid credential: {e}")))?;

            let hash = PasswordHasher::new().hash_password(&input.password)?;
            let stored = repo.replace(&input.username, &hash).await?;
            output::print_success(&format!(
                "Sync login '{}' stored (id: {})",
                stored.name, stored.id
            ));
        }
        CredentialCommand::Check { username, password } => {
            let username = prompt_username(username)?;
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Sync password")
                    .interact()
                    .map_err(input_error)?,
            };

            let login = SyncLogin::load(&repo as &dyn CredentialStore).await?;
            if !login.is_configured() {
                return Err(AppError::configuration("No sync login stored"));
            }
            if login.verify(&username, &password) {
                output::print_success("Credentials accepted.");
            } else {
                return Err(AppError::authentication("Credentials rejected"));
            }
        }
    }

    db.close().await;
    Ok(())
}

fn prompt_username(username: &Option<String>) -> Result<String, AppError> {
    match username {
        Some(u) => Ok(u.clone()),
        None => dialoguer::Input::new()
            .with_prompt("Sync login name")
            .interact_text()
            .map_err(input_error),
    }
}
