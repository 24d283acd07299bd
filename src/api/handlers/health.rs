//! Health check endpoint handlers.

use axum::{Router, extract::State, response::Json, routing::get};
use jiff::Timestamp;

use crate::api::dto::{HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health` - Basic health check
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Basic health check endpoint for monitoring and load balancers.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        version: state.version.clone(),
        timestamp: Timestamp::now().to_string(),
    })
}
