//! Runtime-reconfigurable pool capacity
//!
//! Resize requests are staged and applied atomically at the control
//! loop's capacity phase, so a tick never observes the limit changing
//! mid-flight. Shrinking only reduces future fill-phase submissions and
//! never preempts an already-active job.

use crate::error::{AppError, AppResult};

#[derive(Debug)]
pub struct PoolCapacityController {
    current: usize,
    staged: Option<usize>,
}

impl PoolCapacityController {
    pub fn new(initial: usize) -> Self {
        Self {
            current: initial,
            staged: None,
        }
    }

    /// Concurrency limit in effect for the fill phase
    pub fn current(&self) -> usize {
        self.current
    }

    /// Stage a new capacity, validated at the boundary so a bad request
    /// never reaches the control loop's state
    pub fn request(&mut self, capacity: usize) -> AppResult<()> {
        if capacity == 0 {
            return Err(AppError::Validation {
                field: "capacity".to_string(),
                reason: "pool capacity must be a positive integer".to_string(),
            });
        }
        self.staged = Some(capacity);
        Ok(())
    }

    /// Apply the staged request, returning `(old, new)` when a change
    /// took effect
    pub fn apply(&mut self) -> Option<(usize, usize)> {
        let staged = self.staged.take()?;
        if staged == self.current {
            return None;
        }
        let old = self.current;
        self.current = staged;
        Some((old, staged))
    }
}
