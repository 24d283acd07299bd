//! Run command handler
//!
//! Drives a manifest of jobs through the pool: builds the Slurm backend
//! and the job manager, serves the control API while jobs are in
//! flight, and tears everything down once the pool settles.

use std::path::Path;
use std::sync::Arc;

use crate::backend::SlurmBackend;
use crate::cli::manifest::JobManifest;
use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::pool::JobManager;
use crate::runtime::{self, RuntimeFile};
use crate::server::Server;
use crate::state::AppState;

/// Handler for the run command
pub struct RunCommandHandler {
    settings: Settings,
}

impl RunCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Execute the run command with optional dry-run support
    ///
    /// # Arguments
    /// * `manifest_path` - Path to the TOML job manifest
    /// * `dry_run` - If true, validates manifest and configuration and exits
    ///
    /// # Errors
    /// - Manifest loading or validation errors
    /// - Configuration validation errors
    /// - Runtime file or server startup errors
    pub async fn execute(&self, manifest_path: &Path, dry_run: bool) -> AppResult<()> {
        let manifest = JobManifest::load(manifest_path)?;

        if dry_run {
            return self.validate_only(&manifest);
        }

        self.run_pool(manifest).await
    }

    /// Validate manifest and configuration without contacting the cluster
    fn validate_only(&self, manifest: &JobManifest) -> AppResult<()> {
        self.settings.validate()?;

        println!("✓ Manifest is valid: {} job(s)", manifest.jobs.len());
        for entry in &manifest.jobs {
            println!("  {} ({})", entry.id, entry.spec.resource_summary());
        }
        println!(
            "✓ Pool capacity: {} concurrent job(s), {} retries, tick every {}s",
            self.settings.pool.max_concurrent_jobs,
            self.settings.pool.max_retries,
            self.settings.pool.check_interval_secs,
        );
        if self.settings.server.enabled {
            println!(
                "✓ Control API would bind to: {}",
                self.settings.server.address()
            );
        } else {
            println!("✓ Control API disabled");
        }
        println!("Dry run completed successfully");

        Ok(())
    }

    /// Run the pool to completion
    async fn run_pool(&self, manifest: JobManifest) -> AppResult<()> {
        let backend = Arc::new(SlurmBackend::new(self.settings.slurm.clone()));
        let (mut manager, handle) = JobManager::new(backend, &self.settings.pool);

        let total = manifest.jobs.len();
        for entry in manifest.jobs {
            manager.add_job(entry.id, entry.spec)?;
        }

        tracing::info!(
            jobs = total,
            capacity = self.settings.pool.max_concurrent_jobs,
            "Pool starting"
        );

        let runtime_path = runtime::path_from(&self.settings.control);
        let mut server_task = None;
        if self.settings.server.enabled {
            RuntimeFile::current(self.settings.server.address()).write(&runtime_path)?;

            let state = AppState::new(
                handle.clone(),
                self.settings.application.version.clone(),
            );
            let server = Server::new(self.settings.clone());
            server_task = Some(tokio::spawn(server.run(state)));
        }

        manager.run().await;

        // The loop has settled or was shut down; either way release the
        // control API so its graceful shutdown completes.
        handle.shutdown();
        if let Some(task) = server_task {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => tracing::error!(error = %e, "Control API exited with error"),
                Err(e) => tracing::error!(error = %e, "Control API task panicked"),
            }
        }
        if self.settings.server.enabled {
            runtime::remove(&runtime_path);
        }

        let snapshot = handle.snapshot();
        tracing::info!(
            completed = snapshot.counts.completed,
            failed = snapshot.counts.failed,
            cancelled = snapshot.counts.cancelled,
            "Pool finished"
        );
        println!(
            "Pool finished: {} completed, {} failed, {} cancelled",
            snapshot.counts.completed, snapshot.counts.failed, snapshot.counts.cancelled
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn manifest_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[tokio::test]
    async fn test_dry_run_accepts_valid_manifest() {
        let file = manifest_file(
            r#"
            [[job]]
            id = "a"
            script_path = "a.py"
            "#,
        );
        let handler = RunCommandHandler::new(Settings::default());
        let result = handler.execute(file.path(), true).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_dry_run_rejects_invalid_manifest() {
        let file = manifest_file(
            r#"
            [[job]]
            id = "a"
            script_path = ""
            "#,
        );
        let handler = RunCommandHandler::new(Settings::default());
        let result = handler.execute(file.path(), true).await;
        assert!(result.is_err());
    }
}
