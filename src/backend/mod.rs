//! Batch-scheduling backend boundary
//!
//! The pool only ever talks to the scheduler through the
//! `SubmissionBackend` trait; `SlurmBackend` is the production
//! implementation.

pub mod cluster;
pub mod error;
pub mod script;
pub mod slurm;
pub mod traits;

pub use cluster::ClusterInfo;
pub use error::{CancelError, PollError, SubmissionError};
pub use slurm::SlurmBackend;
pub use traits::{BackendHandle, RemoteState, SubmissionBackend};
