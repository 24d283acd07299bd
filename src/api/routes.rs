//! Router configuration for the API.
//!
//! This module provides centralized route registration and middleware
//! configuration for the application.

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::api::handlers;
use crate::api::middleware::{logging_middleware, request_id_middleware};
use crate::state::AppState;

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Middleware is applied in reverse order of declaration (last added
/// runs first): the request ID middleware runs before logging so log
/// lines carry the ID.
///
/// # Routes
/// - `/api/health` - Health check
/// - `/api/status`, `/api/jobs/{id}` - Status observation
/// - `/api/pool/resize`, `/api/jobs/cancel`, `/api/shutdown` - Control
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(handlers::health::health_routes())
        .merge(handlers::status::status_routes())
        .merge(handlers::control::control_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
