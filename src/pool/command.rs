//! Control commands delivered to the pool's command channel
//!
//! External triggers (operator tools, HTTP handlers, signal handlers)
//! never touch the job collections directly; they send a command that
//! the control loop drains at the start of each tick.

use regex::Regex;

use crate::error::{AppError, AppResult};

/// Which jobs a cancellation targets
#[derive(Debug, Clone)]
pub enum JobSelector {
    /// Exact job identifiers
    Ids(Vec<String>),
    /// Glob-style identifier pattern; `*` matches any substring and the
    /// pattern is anchored to the full identifier
    Pattern(JobPattern),
    /// Every pending and active job
    All,
}

impl JobSelector {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            JobSelector::Ids(ids) => ids.iter().any(|i| i == id),
            JobSelector::Pattern(pattern) => pattern.matches(id),
            JobSelector::All => true,
        }
    }
}

/// Compiled glob pattern over job identifiers
#[derive(Debug, Clone)]
pub struct JobPattern {
    regex: Regex,
}

impl JobPattern {
    /// Compile a glob pattern. A pattern without `*` only matches the
    /// exact identifier.
    pub fn new(pattern: &str) -> AppResult<Self> {
        let escaped = regex::escape(pattern).replace("\\*", ".*");
        let regex = Regex::new(&format!("^{}$", escaped)).map_err(|e| AppError::Validation {
            field: "pattern".to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { regex })
    }

    pub fn matches(&self, id: &str) -> bool {
        self.regex.is_match(id)
    }
}

/// Commands understood by the control loop
#[derive(Debug, Clone)]
pub enum PoolCommand {
    /// Stage a new concurrency limit, applied at the next capacity phase
    Resize(usize),
    /// Cancel the selected jobs
    Cancel(JobSelector),
}
