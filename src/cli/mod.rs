//! CLI module for gridpool
//!
//! This module provides command-line interface functionality including:
//! - Argument parsing with clap
//! - Configuration merging (CLI args + config files)
//! - Job manifest loading
//! - Command handlers for run, status, resize, cancel, stop and cluster

pub mod config_merger;
pub mod executor;
pub mod handlers;
pub mod manifest;
pub mod parser;
pub mod validation;

// Re-export public types for convenience
pub use config_merger::ConfigurationMerger;
pub use executor::execute_command;
pub use manifest::JobManifest;
pub use parser::{Cli, Commands, Environment};

use crate::config::settings::Settings;
use crate::logger::{LoggerHandle, init_logger};

/// Load and merge configuration from CLI arguments
///
/// This function handles the complete configuration loading process:
/// 1. Load base configuration from files
/// 2. Merge CLI argument overrides
/// 3. Validate the final configuration
///
/// # Errors
/// Returns error if configuration loading, merging, or validation fails
pub fn load_and_merge_config(cli: &Cli) -> anyhow::Result<Settings> {
    let merger = ConfigurationMerger::from_cli(cli)?;
    Ok(merger.merge_cli_args(cli)?)
}

/// Initialize logger from settings
///
/// Returns a handle the caller keeps so the file sink can be flushed
/// before the process exits.
///
/// # Errors
/// Returns error if the logger configuration is invalid or the logger
/// cannot be installed
pub fn init_logger_from_settings(settings: &Settings) -> anyhow::Result<LoggerHandle> {
    let logger_config = settings.logger.clone().into_logger_config()?;
    init_logger(logger_config)
}
