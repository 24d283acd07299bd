//! Bounded-concurrency job pool
//!
//! The orchestration engine: job lifecycle state machine, admission and
//! fill loop, retry policy, runtime-reconfigurable capacity and graceful
//! shutdown. See `manager` for the control loop itself.

pub mod capacity;
pub mod command;
pub mod job;
pub mod manager;
pub mod queue;
pub mod retry;
pub mod snapshot;
pub mod spec;

pub use command::{JobPattern, JobSelector, PoolCommand};
pub use job::{JobRecord, JobState};
pub use manager::{JobManager, PoolHandle};
pub use queue::PendingQueue;
pub use retry::RetryPolicy;
pub use snapshot::{JobSummary, StateCounts, StatusSnapshot};
pub use spec::JobSpec;
