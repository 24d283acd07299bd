//! Pool control endpoints.
//!
//! Every operation here turns into a command on the pool's channel; the
//! control loop applies it at its next safe point. Validation happens at
//! this boundary so a bad request never reaches the loop's state.

use axum::{Router, extract::State, response::Json, routing::post};
use validator::Validate;

use crate::api::dto::{CancelRequest, ControlResponse, ResizeRequest};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Creates control routes.
///
/// # Routes
/// - `POST /pool/resize` - Stage a new concurrency limit
/// - `POST /jobs/cancel` - Cancel jobs by id, pattern, or all
/// - `POST /shutdown` - Graceful shutdown (cancel all, then stop)
pub fn control_routes() -> Router<AppState> {
    Router::new()
        .route("/pool/resize", post(resize_pool))
        .route("/jobs/cancel", post(cancel_jobs))
        .route("/shutdown", post(shutdown))
}

async fn resize_pool(
    State(state): State<AppState>,
    Json(request): Json<ResizeRequest>,
) -> AppResult<Json<ControlResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        field: "capacity".to_string(),
        reason: e.to_string(),
    })?;

    state.pool.resize(request.capacity)?;
    Ok(Json(ControlResponse::accepted(format!(
        "capacity change to {} staged for the next tick",
        request.capacity
    ))))
}

async fn cancel_jobs(
    State(state): State<AppState>,
    Json(request): Json<CancelRequest>,
) -> AppResult<Json<ControlResponse>> {
    let selector = request.into_selector()?;
    state.pool.cancel(selector)?;
    Ok(Json(ControlResponse::accepted("cancellation requested")))
}

async fn shutdown(State(state): State<AppState>) -> Json<ControlResponse> {
    state.pool.shutdown();
    Json(ControlResponse::accepted(
        "shutting down, all jobs will be cancelled",
    ))
}
