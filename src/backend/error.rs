//! Error taxonomy for the submission backend boundary
//!
//! The three failure classes are deliberately distinct: a rejected
//! submission terminally fails the job with no retry, a runtime failure
//! reported by polling is governed by the retry policy, and a poll error
//! is transient and leaves the job active for the next tick.

use thiserror::Error;

/// The backend rejected the job specification; the job never ran
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("failed to write batch script: {0}")]
    Script(#[from] std::io::Error),

    #[error("submission command failed: {stderr}")]
    CommandFailed { stderr: String },

    #[error("submission command timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("could not parse job handle from submission output: {output:?}")]
    UnparsableHandle { output: String },
}

/// Transient failure while checking job status; the job stays active
#[derive(Debug, Error)]
pub enum PollError {
    #[error("status command failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("status command failed: {stderr}")]
    CommandFailed { stderr: String },

    #[error("status command timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("could not interpret accounting output: {output:?}")]
    UnparsableState { output: String },
}

/// Backend cancellation call failed; the job is still forced to
/// CANCELLED locally
#[derive(Debug, Error)]
pub enum CancelError {
    #[error("cancel command failed to start: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("cancel command failed: {stderr}")]
    CommandFailed { stderr: String },

    #[error("cancel command timed out after {seconds}s")]
    Timeout { seconds: u64 },
}
