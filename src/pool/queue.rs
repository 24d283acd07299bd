//! Ordered backlog of not-yet-submitted jobs
//!
//! Never-submitted jobs are served FIFO via `push_back`/`pop_front`;
//! retried jobs re-enter at the front so they run before any job that
//! has not yet had a first attempt.

use std::collections::VecDeque;

use crate::pool::job::JobRecord;

#[derive(Debug, Default)]
pub struct PendingQueue {
    jobs: VecDeque<JobRecord>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job awaiting its first submission attempt
    pub fn push_back(&mut self, job: JobRecord) {
        self.jobs.push_back(job);
    }

    /// Priority reinsertion for a retried job
    pub fn push_front(&mut self, job: JobRecord) {
        self.jobs.push_front(job);
    }

    /// Next job to submit
    pub fn pop_front(&mut self) -> Option<JobRecord> {
        self.jobs.pop_front()
    }

    /// Remove a specific job from the backlog without submitting it
    pub fn remove(&mut self, id: &str) -> Option<JobRecord> {
        let pos = self.jobs.iter().position(|j| j.id == id)?;
        self.jobs.remove(pos)
    }

    /// Remove every queued job, preserving order
    pub fn drain(&mut self) -> Vec<JobRecord> {
        self.jobs.drain(..).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.jobs.iter().any(|j| j.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &JobRecord> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::spec::JobSpec;

    fn job(id: &str) -> JobRecord {
        JobRecord::new(id.to_string(), JobSpec::new("a.py"))
    }

    #[test]
    fn test_fifo_order() {
        let mut q = PendingQueue::new();
        q.push_back(job("a"));
        q.push_back(job("b"));
        q.push_back(job("c"));

        assert_eq!(q.pop_front().unwrap().id, "a");
        assert_eq!(q.pop_front().unwrap().id, "b");
        assert_eq!(q.pop_front().unwrap().id, "c");
        assert!(q.pop_front().is_none());
    }

    #[test]
    fn test_push_front_takes_priority() {
        let mut q = PendingQueue::new();
        q.push_back(job("fresh"));
        q.push_front(job("retried"));

        assert_eq!(q.pop_front().unwrap().id, "retried");
        assert_eq!(q.pop_front().unwrap().id, "fresh");
    }

    #[test]
    fn test_remove_by_id() {
        let mut q = PendingQueue::new();
        q.push_back(job("a"));
        q.push_back(job("b"));
        q.push_back(job("c"));

        let removed = q.remove("b").unwrap();
        assert_eq!(removed.id, "b");
        assert_eq!(q.len(), 2);
        assert!(!q.contains("b"));
        assert!(q.remove("b").is_none());
    }

    #[test]
    fn test_drain_preserves_order() {
        let mut q = PendingQueue::new();
        q.push_back(job("a"));
        q.push_back(job("b"));

        let drained = q.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].id, "a");
        assert!(q.is_empty());
    }
}
