//! Status observation endpoints.
//!
//! These handlers only read the most recently published snapshot; they
//! never touch the pool's collections directly.

use axum::{
    Router,
    extract::{Path, State},
    response::Json,
    routing::get,
};

use crate::error::{AppError, AppResult};
use crate::pool::{JobSummary, StatusSnapshot};
use crate::state::AppState;

/// Creates status routes.
///
/// # Routes
/// - `GET /status` - Full status snapshot
/// - `GET /jobs/{id}` - Single job summary
pub fn status_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(full_status))
        .route("/jobs/{id}", get(job_status))
}

/// Full status dump: every job plus aggregate counts.
async fn full_status(State(state): State<AppState>) -> Json<StatusSnapshot> {
    Json(state.pool.snapshot())
}

/// Summary of a single job by its identifier.
async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobSummary>> {
    let snapshot = state.pool.snapshot();
    snapshot
        .jobs
        .into_iter()
        .find(|job| job.id == id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound {
            entity: "job".to_string(),
            field: "id".to_string(),
            value: id,
        })
}
