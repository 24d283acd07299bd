//! Submission backend contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::error::{CancelError, PollError, SubmissionError};
use crate::pool::JobSpec;

/// Backend-issued identifier, distinct from the manager's own job id.
/// Set once on successful submission and never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackendHandle(pub String);

impl BackendHandle {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BackendHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BackendHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Job state as reported by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    /// Still queued or running on the backend
    Active,
    /// Finished successfully
    Completed,
    /// Ran and failed (including timeout and out-of-memory kills)
    Failed,
}

/// External system that actually executes work and reports its status.
///
/// `cancel` must be idempotent: cancelling an already-terminal or unknown
/// handle returns `Ok(())`.
#[async_trait]
pub trait SubmissionBackend: Send + Sync {
    /// Submit a job, returning the backend handle on acceptance
    async fn submit(&self, job_id: &str, spec: &JobSpec) -> Result<BackendHandle, SubmissionError>;

    /// Check the current state of a previously submitted job
    async fn poll(&self, handle: &BackendHandle) -> Result<RemoteState, PollError>;

    /// Best-effort cancellation of a previously submitted job
    async fn cancel(&self, handle: &BackendHandle) -> Result<(), CancelError>;
}
