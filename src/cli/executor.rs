//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{ClusterCommandHandler, ControlCommandHandler, RunCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// This function dispatches to the appropriate command handler based on
/// the parsed CLI arguments.
///
/// # Arguments
/// * `cli` - Parsed CLI arguments
/// * `settings` - Merged and validated settings
///
/// # Errors
/// Returns errors from command handlers or validation failures
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    if let Err(msg) = cli.validate() {
        return Err(crate::error::AppError::Validation {
            field: "cli_arguments".to_string(),
            reason: msg,
        });
    }

    match &cli.command {
        Commands::Run {
            jobs,
            capacity: _,
            dry_run,
        } => {
            RunCommandHandler::new(settings)
                .execute(jobs, *dry_run)
                .await
        }
        Commands::Status { job, endpoint } => {
            ControlCommandHandler::new(settings, endpoint.clone())
                .status(job.as_deref())
                .await
        }
        Commands::Resize { capacity, endpoint } => {
            ControlCommandHandler::new(settings, endpoint.clone())
                .resize(*capacity)
                .await
        }
        Commands::Cancel {
            ids,
            pattern,
            all,
            endpoint,
        } => {
            ControlCommandHandler::new(settings, endpoint.clone())
                .cancel(ids.clone(), pattern.clone(), *all)
                .await
        }
        Commands::Stop { endpoint } => {
            ControlCommandHandler::new(settings, endpoint.clone())
                .stop()
                .await
        }
        Commands::Cluster { partition } => {
            ClusterCommandHandler::new(settings)
                .execute(partition.as_deref())
                .await
        }
    }
}
