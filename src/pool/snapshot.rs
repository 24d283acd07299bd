//! Read-only status projection for external consumers

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::pool::job::{JobRecord, JobState};

/// One job's line in a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: String,
    pub state: JobState,
    pub handle: Option<String>,
    pub runtime_secs: Option<i64>,
    pub retry_count: u32,
    pub resources: String,
}

impl From<&JobRecord> for JobSummary {
    fn from(record: &JobRecord) -> Self {
        Self {
            id: record.id.clone(),
            state: record.state,
            handle: record.handle.as_ref().map(|h| h.as_str().to_string()),
            runtime_secs: record.runtime_secs(),
            retry_count: record.retry_count,
            resources: record.spec.resource_summary(),
        }
    }
}

/// Aggregate job counts per state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
    pub pending: usize,
    pub active: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl StateCounts {
    fn record(&mut self, state: JobState) {
        match state {
            JobState::Pending => self.pending += 1,
            JobState::Active => self.active += 1,
            JobState::Completed => self.completed += 1,
            JobState::Failed => self.failed += 1,
            JobState::Cancelled => self.cancelled += 1,
        }
    }
}

/// Point-in-time summary of every job's state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub jobs: Vec<JobSummary>,
    pub counts: StateCounts,
    pub capacity: usize,
    pub timestamp: Timestamp,
}

impl StatusSnapshot {
    /// Build a snapshot over all job collections
    pub fn build<'a, I>(records: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = &'a JobRecord>,
    {
        let mut jobs = Vec::new();
        let mut counts = StateCounts::default();

        for record in records {
            counts.record(record.state);
            jobs.push(JobSummary::from(record));
        }

        Self {
            jobs,
            counts,
            capacity,
            timestamp: Timestamp::now(),
        }
    }

    /// Empty snapshot used before the first tick has run
    pub fn empty(capacity: usize) -> Self {
        Self::build(std::iter::empty(), capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendHandle;
    use crate::pool::spec::JobSpec;

    fn record(id: &str) -> JobRecord {
        JobRecord::new(id.to_string(), JobSpec::new("a.py"))
    }

    #[test]
    fn test_counts_by_state() {
        let mut a = record("a");
        a.mark_active(BackendHandle::from("1"));
        let mut b = record("b");
        b.mark_active(BackendHandle::from("2"));
        b.mark_completed();
        let c = record("c");
        let mut d = record("d");
        d.mark_cancelled();

        let snapshot = StatusSnapshot::build([&a, &b, &c, &d], 4);
        assert_eq!(snapshot.counts.active, 1);
        assert_eq!(snapshot.counts.completed, 1);
        assert_eq!(snapshot.counts.pending, 1);
        assert_eq!(snapshot.counts.cancelled, 1);
        assert_eq!(snapshot.counts.failed, 0);
        assert_eq!(snapshot.jobs.len(), 4);
        assert_eq!(snapshot.capacity, 4);
    }

    #[test]
    fn test_summary_carries_handle_and_retries() {
        let mut a = record("a");
        a.mark_active(BackendHandle::from("777"));
        a.retry_count = 2;

        let snapshot = StatusSnapshot::build([&a], 1);
        let summary = &snapshot.jobs[0];
        assert_eq!(summary.handle.as_deref(), Some("777"));
        assert_eq!(summary.retry_count, 2);
        assert!(summary.runtime_secs.is_some());
        assert_eq!(summary.resources, "default, 1cpu, 1gpu, 16G");
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = StatusSnapshot::empty(8);
        assert!(snapshot.jobs.is_empty());
        assert_eq!(snapshot.counts, StateCounts::default());
        assert_eq!(snapshot.capacity, 8);
    }
}
