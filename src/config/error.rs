//! Errors raised while assembling the layered settings
//!
//! Covers the whole loading pipeline: locating TOML files, merging the
//! `GRIDPOOL_*` environment layer, deserializing into [`Settings`] and the
//! semantic validation that runs afterwards.
//!
//! [`Settings`]: super::settings::Settings

use thiserror::Error;

/// Failure while loading or validating the pool configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// The merged configuration could not be deserialized into settings
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A settings field failed semantic validation after loading
    #[error("Validation error: {field} - {message}")]
    ValidationError {
        /// Dotted path of the offending field, e.g. `pool.max_concurrent_jobs`
        field: String,
        /// What the field's value violated
        message: String,
    },

    /// `GRIDPOOL_APP_ENV` or another environment override holds an
    /// unrecognized value
    #[error("Environment variable error: {0}")]
    EnvVarError(String),

    /// Two configuration sources were given that cannot be combined
    #[error("Mutual exclusivity error: {0}")]
    MutualExclusivityError(String),

    /// Layer merging failed inside the config crate
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

impl ConfigError {
    pub fn file_not_found<S: Into<String>>(path: S) -> Self {
        ConfigError::FileNotFound(path.into())
    }

    pub fn mutual_exclusivity<S: Into<String>>(message: S) -> Self {
        ConfigError::MutualExclusivityError(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_source() {
        let err = ConfigError::file_not_found("/etc/gridpool/missing.toml");
        assert_eq!(
            err.to_string(),
            "Configuration file not found: /etc/gridpool/missing.toml"
        );

        let err = ConfigError::ValidationError {
            field: "pool.max_concurrent_jobs".to_string(),
            message: "must be greater than 0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Validation error: pool.max_concurrent_jobs - must be greater than 0"
        );
    }

    #[test]
    fn test_wraps_config_crate_errors() {
        let inner = config::ConfigError::Message("bad layer".to_string());
        let err = ConfigError::from(inner);
        assert!(matches!(err, ConfigError::Other(_)));
        assert!(err.to_string().contains("bad layer"));
    }
}
