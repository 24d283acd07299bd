//! Request/response DTOs for the pool control endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::pool::{JobPattern, JobSelector};

/// Request body for `POST /api/pool/resize`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ResizeRequest {
    /// New concurrency limit; must be a positive integer
    #[validate(range(min = 1, message = "capacity must be a positive integer"))]
    pub capacity: usize,
}

/// Request body for `POST /api/jobs/cancel`.
///
/// Exactly one of `ids`, `pattern` or `all` must be given.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CancelRequest {
    /// Exact job identifiers to cancel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
    /// Glob-style identifier pattern (`*` matches any substring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Cancel every pending and active job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<bool>,
}

impl CancelRequest {
    /// Turn the request into a job selector, rejecting ambiguous or
    /// empty requests at the boundary.
    pub fn into_selector(self) -> AppResult<JobSelector> {
        let mut given = 0;
        if self.ids.is_some() {
            given += 1;
        }
        if self.pattern.is_some() {
            given += 1;
        }
        if self.all == Some(true) {
            given += 1;
        }
        if given != 1 {
            return Err(AppError::BadRequest {
                message: "exactly one of 'ids', 'pattern' or 'all' must be given".to_string(),
            });
        }

        if let Some(ids) = self.ids {
            if ids.is_empty() {
                return Err(AppError::Validation {
                    field: "ids".to_string(),
                    reason: "id list cannot be empty".to_string(),
                });
            }
            return Ok(JobSelector::Ids(ids));
        }
        if let Some(pattern) = self.pattern {
            return Ok(JobSelector::Pattern(JobPattern::new(&pattern)?));
        }
        Ok(JobSelector::All)
    }
}

/// Acknowledgement returned by control endpoints.
///
/// Commands are applied by the control loop at its next safe point, so
/// the response only confirms acceptance, not completion.
#[derive(Debug, Serialize, Deserialize)]
pub struct ControlResponse {
    pub accepted: bool,
    pub message: String,
}

impl ControlResponse {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            accepted: true,
            message: message.into(),
        }
    }
}
