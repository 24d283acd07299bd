//! Data transfer objects for the HTTP API.

mod control;
mod error;
mod health;

pub use control::{CancelRequest, ControlResponse, ResizeRequest};
pub use error::ErrorResponse;
pub use health::{HealthResponse, HealthStatus};
