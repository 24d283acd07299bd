//! Application state for Axum web framework.
//!
//! Contains shared resources accessible across all request handlers.

use crate::pool::PoolHandle;

/// Application state containing the pool control handle.
///
/// Designed to be used with Axum's State extractor. Cloning is cheap
/// since PoolHandle only holds channel endpoints.
#[derive(Clone)]
pub struct AppState {
    /// Endpoint for commanding and observing the running pool
    pub pool: PoolHandle,
    /// Application version reported by health checks
    pub version: String,
}

impl AppState {
    pub fn new(pool: PoolHandle, version: impl Into<String>) -> Self {
        Self {
            pool,
            version: version.into(),
        }
    }
}
