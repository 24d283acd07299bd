use thiserror::Error;

/// Application-wide error type that represents all possible errors in the system.
///
/// Per-job backend errors (submission, poll, cancel) are contained inside the
/// pool and never surface through this type; `AppError` covers everything that
/// can abort an operation at the application boundary.
#[derive(Error, Debug)]
pub enum AppError {
    /// Job identifier is already tracked by the manager
    #[error("Duplicate job: '{id}' is already tracked")]
    DuplicateJob { id: String },

    /// Resource not found error with entity, field, and value information
    #[error("Resource not found: {entity} with {field}={value}")]
    NotFound {
        entity: String,
        field: String,
        value: String,
    },

    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Bad request error with descriptive message
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The command channel to the control loop is unusable
    #[error("Control channel error: {message}")]
    ControlChannel { message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(error: crate::config::ConfigError) -> Self {
        AppError::Configuration {
            key: "config".to_string(),
            source: anyhow::Error::from(error),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
