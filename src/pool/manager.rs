//! Orchestrator control loop
//!
//! One long-lived task owns every job collection and is the only writer
//! to them. Each tick advances every job exactly once: poll the active
//! set, fill free capacity from the backlog, apply a staged resize, then
//! publish a snapshot when the reporting interval has elapsed. External
//! triggers reach the loop only through the command channel, drained at
//! the start of each cycle; shutdown preempts the sleep between ticks.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::backend::{RemoteState, SubmissionBackend};
use crate::config::PoolConfig;
use crate::error::{AppError, AppResult};
use crate::pool::capacity::PoolCapacityController;
use crate::pool::command::{JobSelector, PoolCommand};
use crate::pool::job::{JobRecord, JobState};
use crate::pool::queue::PendingQueue;
use crate::pool::retry::RetryPolicy;
use crate::pool::snapshot::StatusSnapshot;
use crate::pool::spec::JobSpec;

const COMMAND_BUFFER: usize = 32;

/// Cloneable endpoint for talking to a running pool from other tasks
#[derive(Clone)]
pub struct PoolHandle {
    commands: mpsc::Sender<PoolCommand>,
    snapshot_rx: watch::Receiver<StatusSnapshot>,
    shutdown: CancellationToken,
}

impl PoolHandle {
    /// Stage a new concurrency limit, applied at the next capacity phase
    pub fn resize(&self, capacity: usize) -> AppResult<()> {
        if capacity == 0 {
            return Err(AppError::Validation {
                field: "capacity".to_string(),
                reason: "pool capacity must be a positive integer".to_string(),
            });
        }
        self.send(PoolCommand::Resize(capacity))
    }

    /// Request cancellation of the selected jobs
    pub fn cancel(&self, selector: JobSelector) -> AppResult<()> {
        self.send(PoolCommand::Cancel(selector))
    }

    /// Request cancellation of every pending and active job
    pub fn cancel_all(&self) -> AppResult<()> {
        self.cancel(JobSelector::All)
    }

    /// Most recently published status snapshot
    pub fn snapshot(&self) -> StatusSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Trigger graceful shutdown: cancel everything, then stop the loop
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    fn send(&self, command: PoolCommand) -> AppResult<()> {
        self.commands
            .try_send(command)
            .map_err(|e| AppError::ControlChannel {
                message: e.to_string(),
            })
    }
}

/// The orchestrator: admits jobs, polls active ones, applies the retry
/// policy, fills capacity from the backlog and emits status snapshots
pub struct JobManager {
    backend: Arc<dyn SubmissionBackend>,
    retry: RetryPolicy,
    capacity: PoolCapacityController,
    check_interval: Duration,
    report_interval: Duration,

    backlog: PendingQueue,
    active: BTreeMap<String, JobRecord>,
    completed: BTreeMap<String, JobRecord>,
    /// Terminal failures and cancellations
    failed: BTreeMap<String, JobRecord>,

    commands: mpsc::Receiver<PoolCommand>,
    snapshot_tx: watch::Sender<StatusSnapshot>,
    shutdown: CancellationToken,
    last_report: Option<tokio::time::Instant>,
}

impl JobManager {
    pub fn new(backend: Arc<dyn SubmissionBackend>, config: &PoolConfig) -> (Self, PoolHandle) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) =
            watch::channel(StatusSnapshot::empty(config.max_concurrent_jobs));
        let shutdown = CancellationToken::new();

        let manager = Self {
            backend,
            retry: RetryPolicy::new(config.max_retries),
            capacity: PoolCapacityController::new(config.max_concurrent_jobs),
            check_interval: Duration::from_secs(config.check_interval_secs),
            report_interval: Duration::from_secs(config.report_interval_secs),
            backlog: PendingQueue::new(),
            active: BTreeMap::new(),
            completed: BTreeMap::new(),
            failed: BTreeMap::new(),
            commands: command_rx,
            snapshot_tx,
            shutdown: shutdown.clone(),
            last_report: None,
        };

        let handle = PoolHandle {
            commands: command_tx,
            snapshot_rx,
            shutdown,
        };

        (manager, handle)
    }

    /// Register a new job. Every identifier is tracked exactly once for
    /// the lifetime of the manager.
    pub fn add_job(&mut self, id: String, spec: JobSpec) -> AppResult<()> {
        spec.validate()?;
        if self.is_tracked(&id) {
            return Err(AppError::DuplicateJob { id });
        }
        info!(job_id = %id, resources = %spec.resource_summary(), "Job queued");
        self.backlog.push_back(JobRecord::new(id, spec));
        Ok(())
    }

    /// Current state of a job, wherever it lives
    pub fn job_state(&self, id: &str) -> Option<JobState> {
        if self.backlog.contains(id) {
            return Some(JobState::Pending);
        }
        self.active
            .get(id)
            .or_else(|| self.completed.get(id))
            .or_else(|| self.failed.get(id))
            .map(|job| job.state)
    }

    fn is_tracked(&self, id: &str) -> bool {
        self.job_state(id).is_some()
    }

    /// Drive the pool until every job has settled or shutdown is requested
    pub async fn run(&mut self) {
        info!(
            capacity = self.capacity.current(),
            queued = self.backlog.len(),
            "Job pool started"
        );

        loop {
            self.drain_commands().await;
            if self.shutdown.is_cancelled() {
                self.shutdown_now().await;
                return;
            }

            self.tick().await;

            if self.active.is_empty() && self.backlog.is_empty() {
                info!(
                    completed = self.completed.len(),
                    failed = self.failed.len(),
                    "All jobs settled, pool loop exiting"
                );
                self.publish_snapshot();
                return;
            }

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    self.shutdown_now().await;
                    return;
                }
                _ = tokio::time::sleep(self.check_interval) => {}
            }
        }
    }

    /// One poll / fill / capacity / report cycle
    async fn tick(&mut self) {
        self.poll_phase().await;
        self.fill_phase().await;
        if let Some((old, new)) = self.capacity.apply() {
            info!(old, new, "Pool capacity changed");
        }
        self.report_phase();
    }

    /// Advance every active job by one status check
    async fn poll_phase(&mut self) {
        let ids: Vec<String> = self.active.keys().cloned().collect();
        for id in ids {
            let Some(handle) = self.active.get(&id).and_then(|j| j.handle.clone()) else {
                continue;
            };

            match self.backend.poll(&handle).await {
                Ok(RemoteState::Active) => {}
                Ok(RemoteState::Completed) => {
                    if let Some(mut job) = self.active.remove(&id) {
                        job.mark_completed();
                        info!(job_id = %id, runtime_secs = job.runtime_secs(), "Job completed");
                        self.completed.insert(id, job);
                    }
                }
                Ok(RemoteState::Failed) => self.handle_runtime_failure(&id),
                Err(e) => {
                    // Transient: the job stays active and is polled again
                    // next tick, without touching its retry budget
                    warn!(job_id = %id, error = %e, "Status poll failed, will retry next tick");
                }
            }
        }
    }

    fn handle_runtime_failure(&mut self, id: &str) {
        let Some(mut job) = self.active.remove(id) else {
            return;
        };

        if self.retry.should_retry(job.retry_count) {
            job.mark_retrying();
            info!(
                job_id = %id,
                attempt = job.retry_count,
                max_retries = self.retry.max_retries(),
                "Job failed, requeued for retry"
            );
            self.backlog.push_front(job);
        } else {
            job.mark_failed();
            warn!(job_id = %id, "Job failed and exhausted its retry budget");
            self.failed.insert(id.to_string(), job);
        }
    }

    /// Submit from the backlog until the pool is full or the backlog empty
    async fn fill_phase(&mut self) {
        while self.active.len() < self.capacity.current() {
            let Some(mut job) = self.backlog.pop_front() else {
                break;
            };

            match self.backend.submit(&job.id, &job.spec).await {
                Ok(handle) => {
                    info!(job_id = %job.id, handle = %handle, "Job submitted");
                    job.mark_active(handle);
                    self.active.insert(job.id.clone(), job);
                }
                Err(e) => {
                    // The backend rejected the spec before the job ever
                    // ran; it fails without consuming retry budget
                    error!(job_id = %job.id, error = %e, "Submission rejected");
                    job.mark_failed();
                    self.failed.insert(job.id.clone(), job);
                }
            }
        }
    }

    fn report_phase(&mut self) {
        let now = tokio::time::Instant::now();
        let due = match self.last_report {
            Some(last) => now.duration_since(last) >= self.report_interval,
            None => true,
        };
        if due {
            info!(
                capacity = self.capacity.current(),
                pending = self.backlog.len(),
                active = self.active.len(),
                completed = self.completed.len(),
                failed = self.failed.len(),
                "Pool status"
            );
            self.publish_snapshot();
            self.last_report = Some(now);
        }
    }

    async fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                PoolCommand::Resize(capacity) => {
                    if let Err(e) = self.capacity.request(capacity) {
                        warn!(error = %e, "Rejected capacity request");
                    } else {
                        info!(capacity, "Capacity change staged");
                    }
                }
                PoolCommand::Cancel(selector) => self.cancel_matching(&selector).await,
            }
        }
    }

    /// Cancel every matching non-terminal job. Active jobs get a
    /// best-effort backend call; queued jobs never started, so they are
    /// cancelled without backend contact. Terminal jobs are untouched.
    async fn cancel_matching(&mut self, selector: &JobSelector) {
        let active_ids: Vec<String> = self
            .active
            .keys()
            .filter(|id| selector.matches(id))
            .cloned()
            .collect();

        for id in active_ids {
            let Some(mut job) = self.active.remove(&id) else {
                continue;
            };
            if let Some(handle) = &job.handle {
                if let Err(e) = self.backend.cancel(handle).await {
                    warn!(job_id = %id, error = %e, "Backend cancel failed, forcing local cancellation");
                }
            }
            job.mark_cancelled();
            info!(job_id = %id, "Job cancelled");
            self.failed.insert(id, job);
        }

        let queued_ids: Vec<String> = self
            .backlog
            .iter()
            .filter(|job| selector.matches(&job.id))
            .map(|job| job.id.clone())
            .collect();

        for id in queued_ids {
            if let Some(mut job) = self.backlog.remove(&id) {
                job.mark_cancelled();
                info!(job_id = %id, "Queued job cancelled");
                self.failed.insert(id, job);
            }
        }
    }

    async fn shutdown_now(&mut self) {
        info!(
            active = self.active.len(),
            queued = self.backlog.len(),
            "Shutdown requested, cancelling all jobs"
        );
        self.cancel_matching(&JobSelector::All).await;
        self.publish_snapshot();
    }

    fn publish_snapshot(&self) {
        let records = self
            .backlog
            .iter()
            .chain(self.active.values())
            .chain(self.completed.values())
            .chain(self.failed.values());
        let snapshot = StatusSnapshot::build(records, self.capacity.current());
        self.snapshot_tx.send_replace(snapshot);
    }
}
