//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bounded-concurrency job pool manager for Slurm clusters
#[derive(Parser, Debug)]
#[command(name = "gridpool")]
#[command(about = "Bounded-concurrency job pool manager for Slurm clusters")]
#[command(long_about = "
Gridpool runs a manifest of batch jobs through a Slurm cluster while
keeping at most a configured number of jobs active at once. Failed jobs
are retried up to a budget, and a running pool can be observed and
controlled over a local HTTP API.

EXAMPLES:
    # Run a manifest of jobs with default configuration
    gridpool run --jobs jobs.toml

    # Run with a concurrency limit of 8
    gridpool run --jobs jobs.toml --capacity 8

    # Validate manifest and configuration without submitting anything
    gridpool run --jobs jobs.toml --dry-run

    # Show the status of the running pool
    gridpool status

    # Raise the concurrency limit of the running pool
    gridpool resize 16

    # Cancel jobs by id, by pattern, or all of them
    gridpool cancel --ids render_001 render_002
    gridpool cancel --pattern 'render_*'
    gridpool cancel --all

    # Cancel everything and stop the running pool
    gridpool stop

    # Show cluster partitions and free resources
    gridpool cluster

For more information about configuration options, see the documentation.
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Specify a custom configuration file to use instead of the default.
    /// The file should be in TOML format and contain valid configuration sections.
    /// The file must exist and be readable.
    ///
    /// Example: --config /etc/gridpool/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Force the application to use a specific environment configuration.
    /// This affects which configuration files are loaded and default settings.
    ///
    /// Available values: development (dev), production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Increases log output to debug level, showing detailed information
    /// about pool operations. Useful for troubleshooting.
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Reduces log output to error level only, hiding informational messages.
    /// Useful for automated scripts.
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a manifest of jobs through the pool
    ///
    /// Loads the job manifest, submits jobs up to the concurrency limit,
    /// and keeps polling until every job has settled. While running, the
    /// pool serves a local HTTP API that the status, resize, cancel and
    /// stop commands talk to.
    ///
    /// Examples:
    ///   gridpool run --jobs jobs.toml               # Run with defaults
    ///   gridpool run --jobs jobs.toml --capacity 8  # Limit to 8 active jobs
    ///   gridpool run --jobs jobs.toml --dry-run     # Validate without submitting
    Run {
        /// Job manifest file
        ///
        /// TOML file listing the jobs to run, in submission order.
        /// Each entry names a job id and the script and resources it needs.
        #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_manifest_path)]
        jobs: PathBuf,

        /// Concurrency limit override
        ///
        /// Maximum number of jobs active on the cluster at once.
        /// Overrides the pool.max_concurrent_jobs configuration value.
        /// Must be a positive integer.
        #[arg(long, value_name = "N", value_parser = super::validation::validate_capacity)]
        capacity: Option<usize>,

        /// Validate manifest and configuration, then exit
        ///
        /// Checks every job in the manifest and the merged configuration
        /// without contacting the cluster. Returns exit code 0 if valid.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the status of the running pool
    ///
    /// Fetches the latest status snapshot from the running pool and
    /// prints per-state counts and a line per job.
    ///
    /// Examples:
    ///   gridpool status                 # All jobs
    ///   gridpool status --job render_1  # A single job
    Status {
        /// Show a single job instead of the whole pool
        #[arg(long, value_name = "ID")]
        job: Option<String>,

        /// Control API address override, e.g. 127.0.0.1:7070
        ///
        /// Defaults to the address advertised in the runtime file of the
        /// running pool.
        #[arg(long, value_name = "ADDR")]
        endpoint: Option<String>,
    },
    /// Change the concurrency limit of the running pool
    ///
    /// The new limit takes effect at the pool's next scheduling pass.
    /// Shrinking never interrupts jobs that are already active; the pool
    /// simply stops submitting until attrition brings it under the limit.
    ///
    /// Example:
    ///   gridpool resize 16
    Resize {
        /// New concurrency limit
        #[arg(value_name = "N", value_parser = super::validation::validate_capacity)]
        capacity: usize,

        /// Control API address override, e.g. 127.0.0.1:7070
        #[arg(long, value_name = "ADDR")]
        endpoint: Option<String>,
    },
    /// Cancel pending or active jobs in the running pool
    ///
    /// Exactly one selector must be given. Pending jobs are removed from
    /// the queue without contacting the cluster; active jobs are
    /// cancelled on the cluster as well. Cancelled jobs are never
    /// retried.
    ///
    /// Examples:
    ///   gridpool cancel --ids render_001 render_002
    ///   gridpool cancel --pattern 'render_*'
    ///   gridpool cancel --all
    Cancel {
        /// Exact job ids to cancel
        #[arg(long, value_name = "ID", num_args = 1.., conflicts_with_all = ["pattern", "all"])]
        ids: Vec<String>,

        /// Glob-style id pattern; '*' matches any substring
        #[arg(long, value_name = "PATTERN", conflicts_with = "all")]
        pattern: Option<String>,

        /// Cancel every pending and active job
        #[arg(long)]
        all: bool,

        /// Control API address override, e.g. 127.0.0.1:7070
        #[arg(long, value_name = "ADDR")]
        endpoint: Option<String>,
    },
    /// Cancel all jobs and stop the running pool
    ///
    /// Asks the running pool to cancel every pending and active job and
    /// shut down. The command returns once the request is accepted.
    Stop {
        /// Control API address override, e.g. 127.0.0.1:7070
        #[arg(long, value_name = "ADDR")]
        endpoint: Option<String>,
    },
    /// Show cluster partitions and free resources
    ///
    /// Queries the cluster directly (no running pool required) and
    /// prints every partition with its node, CPU and GPU availability.
    ///
    /// Examples:
    ///   gridpool cluster                  # All partitions
    ///   gridpool cluster --partition gpu  # A single partition
    Cluster {
        /// Show a single partition instead of all of them
        #[arg(long, value_name = "NAME")]
        partition: Option<String>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "test")]
    Test,
}

impl Cli {
    /// Validate CLI argument combinations beyond what clap enforces
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Cancel {
            ids, pattern, all, ..
        } = &self.command
        {
            let selectors = usize::from(!ids.is_empty())
                + usize::from(pattern.is_some())
                + usize::from(*all);
            if selectors == 0 {
                return Err(
                    "One of --ids, --pattern or --all is required for cancel".to_string()
                );
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        Ok(())
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Production => crate::config::Environment::Production,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
