//! Job lifecycle state machine

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::backend::BackendHandle;
use crate::pool::spec::JobSpec;

/// Lifecycle state of a job.
///
/// PENDING and ACTIVE are the only non-terminal states; COMPLETED,
/// FAILED and CANCELLED are terminal and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Pending,
    Active,
    Completed,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Active => "ACTIVE",
            JobState::Completed => "COMPLETED",
            JobState::Failed => "FAILED",
            JobState::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One unit of work and its lifecycle state.
///
/// Created by `add_job`, owned by the manager for its entire life.
/// The `id` is caller-assigned and stable; `handle` is backend-assigned
/// on successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub spec: JobSpec,
    pub handle: Option<BackendHandle>,
    pub state: JobState,
    pub retry_count: u32,
    pub started_at: Option<Timestamp>,
    pub ended_at: Option<Timestamp>,
}

impl JobRecord {
    pub fn new(id: String, spec: JobSpec) -> Self {
        Self {
            id,
            spec,
            handle: None,
            state: JobState::Pending,
            retry_count: 0,
            started_at: None,
            ended_at: None,
        }
    }

    /// Successful submission: PENDING -> ACTIVE
    pub fn mark_active(&mut self, handle: BackendHandle) {
        self.handle = Some(handle);
        self.state = JobState::Active;
        self.started_at = Some(Timestamp::now());
        self.ended_at = None;
    }

    /// Backend reported success: ACTIVE -> COMPLETED
    pub fn mark_completed(&mut self) {
        self.state = JobState::Completed;
        self.retry_count = 0;
        self.ended_at = Some(Timestamp::now());
    }

    /// Retry-eligible failure: ACTIVE -> PENDING re-entry
    pub fn mark_retrying(&mut self) {
        self.retry_count += 1;
        self.state = JobState::Pending;
        self.ended_at = None;
    }

    /// Terminal failure, either submission rejection or retry exhaustion
    pub fn mark_failed(&mut self) {
        self.state = JobState::Failed;
        self.ended_at = Some(Timestamp::now());
    }

    /// Explicit cancellation from PENDING or ACTIVE
    pub fn mark_cancelled(&mut self) {
        self.state = JobState::Cancelled;
        self.ended_at = Some(Timestamp::now());
    }

    /// Elapsed runtime in whole seconds, measured from ACTIVE entry to
    /// terminal entry (or now, while still running)
    pub fn runtime_secs(&self) -> Option<i64> {
        let started = self.started_at?;
        let end = self.ended_at.unwrap_or_else(Timestamp::now);
        Some((end - started).get_seconds())
    }
}
