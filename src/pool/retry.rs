//! Retry policy for jobs that ran and failed
//!
//! A pure function of the failure count: retry-eligible iff
//! `retry_count < max_retries`. Submission rejections never reach this
//! policy; they fail the job outright without consuming retry budget.

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Whether a job with this many prior retries gets another attempt
    pub fn should_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_below_bound() {
        let policy = RetryPolicy::new(2);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
    }

    #[test]
    fn test_exhausted_at_bound() {
        let policy = RetryPolicy::new(2);
        assert!(!policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn test_zero_budget_never_retries() {
        let policy = RetryPolicy::new(0);
        assert!(!policy.should_retry(0));
    }
}
