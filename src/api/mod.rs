//! API module for HTTP handlers, middleware, and DTOs.
//!
//! This module provides the HTTP control surface for the pool,
//! including request handlers, middleware components, and data
//! transfer objects.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
