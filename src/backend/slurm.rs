//! Slurm command-line adapter
//!
//! Implements the submission backend by shelling out to the Slurm user
//! tools. Every invocation carries the configured timeout so a hung
//! scheduler command cannot stall the control loop indefinitely.

use std::process::Output;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::backend::error::{CancelError, PollError, SubmissionError};
use crate::backend::script;
use crate::backend::traits::{BackendHandle, RemoteState, SubmissionBackend};
use crate::config::SlurmConfig;
use crate::pool::JobSpec;

/// Accounting states that mean the job ran and did not succeed
const FAILED_STATES: &[&str] = &["FAILED", "TIMEOUT", "OUT_OF_MEMORY", "CANCELLED", "NODE_FAIL"];

/// Submission backend backed by the Slurm CLI tools
pub struct SlurmBackend {
    config: SlurmConfig,
}

impl SlurmBackend {
    pub fn new(config: SlurmConfig) -> Self {
        Self { config }
    }

    async fn run(&self, program: &str, args: &[&str]) -> Result<Output, CommandError> {
        let seconds = self.config.command_timeout_secs;
        let future = Command::new(program).args(args).output();

        match tokio::time::timeout(Duration::from_secs(seconds), future).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(CommandError::Spawn(e)),
            Err(_) => Err(CommandError::Timeout { seconds }),
        }
    }
}

/// Shared failure shape for a single command invocation, mapped into the
/// per-operation error types at each call site
enum CommandError {
    Spawn(std::io::Error),
    Timeout { seconds: u64 },
}

/// Extract the backend job id from sbatch output
/// ("Submitted batch job 12345" -> "12345")
fn parse_submit_output(stdout: &str) -> Option<BackendHandle> {
    stdout
        .split_whitespace()
        .last()
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .map(BackendHandle::from)
}

/// Interpret the first accounting state token from `sacct -o State -n`
///
/// An empty or unrecognized state is treated as still active: accounting
/// records can lag behind the queue, and the next tick will poll again.
fn parse_accounting_state(stdout: &str) -> RemoteState {
    let state = stdout.split_whitespace().next().unwrap_or("");
    // sacct may suffix cancelled states, e.g. "CANCELLED by 1000"
    if state == "COMPLETED" {
        RemoteState::Completed
    } else if FAILED_STATES.iter().any(|f| state.starts_with(f)) {
        RemoteState::Failed
    } else {
        RemoteState::Active
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

#[async_trait]
impl SubmissionBackend for SlurmBackend {
    async fn submit(&self, job_id: &str, spec: &JobSpec) -> Result<BackendHandle, SubmissionError> {
        let script_path = script::write(&self.config.script_dir(), job_id, spec).await?;

        let path_arg = script_path.display().to_string();
        let result = self.run(&self.config.sbatch, &[path_arg.as_str()]).await;

        // The script has served its purpose once sbatch has read it
        if let Err(e) = tokio::fs::remove_file(&script_path).await {
            debug!(path = %script_path.display(), error = %e, "Could not remove batch script");
        }

        let output = match result {
            Ok(output) => output,
            Err(CommandError::Spawn(e)) => return Err(SubmissionError::Script(e)),
            Err(CommandError::Timeout { seconds }) => {
                return Err(SubmissionError::Timeout { seconds });
            }
        };

        if !output.status.success() {
            return Err(SubmissionError::CommandFailed {
                stderr: stderr_text(&output),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_submit_output(&stdout).ok_or_else(|| SubmissionError::UnparsableHandle {
            output: stdout.trim().to_string(),
        })
    }

    async fn poll(&self, handle: &BackendHandle) -> Result<RemoteState, PollError> {
        // Jobs still known to the queue are active regardless of their
        // queue state (pending, running, completing)
        let queue_output = self
            .run(&self.config.squeue, &["-j", handle.as_str(), "-h"])
            .await
            .map_err(|e| match e {
                CommandError::Spawn(e) => PollError::Spawn(e),
                CommandError::Timeout { seconds } => PollError::Timeout { seconds },
            })?;

        if queue_output.status.success()
            && !String::from_utf8_lossy(&queue_output.stdout).trim().is_empty()
        {
            return Ok(RemoteState::Active);
        }

        // Gone from the queue: consult accounting for the final state
        let acct_output = self
            .run(
                &self.config.sacct,
                &["-j", handle.as_str(), "-o", "State", "-n"],
            )
            .await
            .map_err(|e| match e {
                CommandError::Spawn(e) => PollError::Spawn(e),
                CommandError::Timeout { seconds } => PollError::Timeout { seconds },
            })?;

        if !acct_output.status.success() {
            return Err(PollError::CommandFailed {
                stderr: stderr_text(&acct_output),
            });
        }

        let stdout = String::from_utf8_lossy(&acct_output.stdout);
        Ok(parse_accounting_state(&stdout))
    }

    async fn cancel(&self, handle: &BackendHandle) -> Result<(), CancelError> {
        let output = self
            .run(&self.config.scancel, &[handle.as_str()])
            .await
            .map_err(|e| match e {
                CommandError::Spawn(e) => CancelError::Spawn(e),
                CommandError::Timeout { seconds } => CancelError::Timeout { seconds },
            })?;

        if output.status.success() {
            return Ok(());
        }

        // Cancelling a finished or unknown job reports success: the
        // desired end state already holds
        let stderr = stderr_text(&output);
        if stderr.contains("Invalid job id") {
            warn!(handle = %handle, "Cancel targeted an unknown job, treating as done");
            return Ok(());
        }

        Err(CancelError::CommandFailed { stderr })
    }
}
