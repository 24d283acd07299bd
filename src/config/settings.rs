//! Configuration settings structures for gridpool
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "gridpool".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    7070
}

fn default_request_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent_jobs() -> usize {
    4
}

fn default_check_interval() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    3
}

fn default_report_interval() -> u64 {
    300
}

fn default_sbatch() -> String {
    "sbatch".to_string()
}

fn default_squeue() -> String {
    "squeue".to_string()
}

fn default_sacct() -> String {
    "sacct".to_string()
}

fn default_scancel() -> String {
    "scancel".to_string()
}

fn default_sinfo() -> String {
    "sinfo".to_string()
}

fn default_scontrol() -> String {
    "scontrol".to_string()
}

fn default_command_timeout() -> u64 {
    30
}

fn default_runtime_file() -> String {
    std::env::temp_dir()
        .join("gridpool.json")
        .to_string_lossy()
        .into_owned()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_path() -> String {
    "logs/gridpool.log".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// Axum HTTP server configuration for the status/control API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Whether the HTTP status/control API is served at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Get the full server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
        }
    }
}

// ============================================================================
// Pool Configuration
// ============================================================================

/// Job pool configuration: concurrency bound, polling cadence, retry budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum number of concurrently active jobs
    #[serde(default = "default_max_concurrent_jobs")]
    pub max_concurrent_jobs: usize,

    /// Seconds between control-loop ticks
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,

    /// Maximum retry-eligible failures before a job becomes terminally failed
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Seconds between status snapshot publications
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: default_max_concurrent_jobs(),
            check_interval_secs: default_check_interval(),
            max_retries: default_max_retries(),
            report_interval_secs: default_report_interval(),
        }
    }
}

impl PoolConfig {
    /// Validates the pool configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_jobs == 0 {
            return Err(ConfigError::ValidationError {
                field: "pool.max_concurrent_jobs".to_string(),
                message: "Pool capacity must be positive".to_string(),
            });
        }

        if self.check_interval_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "pool.check_interval_secs".to_string(),
                message: "Check interval must be positive".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Slurm Backend Configuration
// ============================================================================

/// Slurm command-line adapter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlurmConfig {
    /// Path to the sbatch binary
    #[serde(default = "default_sbatch")]
    pub sbatch: String,

    /// Path to the squeue binary
    #[serde(default = "default_squeue")]
    pub squeue: String,

    /// Path to the sacct binary
    #[serde(default = "default_sacct")]
    pub sacct: String,

    /// Path to the scancel binary
    #[serde(default = "default_scancel")]
    pub scancel: String,

    /// Path to the sinfo binary
    #[serde(default = "default_sinfo")]
    pub sinfo: String,

    /// Path to the scontrol binary
    #[serde(default = "default_scontrol")]
    pub scontrol: String,

    /// Timeout in seconds applied to every backend command invocation
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// Directory for generated batch scripts (system temp dir when empty)
    #[serde(default)]
    pub script_dir: String,
}

impl Default for SlurmConfig {
    fn default() -> Self {
        Self {
            sbatch: default_sbatch(),
            squeue: default_squeue(),
            sacct: default_sacct(),
            scancel: default_scancel(),
            sinfo: default_sinfo(),
            scontrol: default_scontrol(),
            command_timeout_secs: default_command_timeout(),
            script_dir: String::new(),
        }
    }
}

impl SlurmConfig {
    /// Directory where generated batch scripts are written
    pub fn script_dir(&self) -> PathBuf {
        if self.script_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.script_dir)
        }
    }
}

// ============================================================================
// Control Configuration
// ============================================================================

/// Operator control surface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Path of the runtime file advertising pid and control address
    #[serde(default = "default_runtime_file")]
    pub runtime_file: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            runtime_file: default_runtime_file(),
        }
    }
}

// ============================================================================
// Logger Settings (compatible with LoggerConfig)
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console output settings
    #[serde(default)]
    pub console: ConsoleSettings,

    /// File output settings
    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings into the runtime LoggerConfig used by the logger module
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format =
            self.file
                .format
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::ValidationError {
                    field: "logger.file.format".to_string(),
                    message: e.to_string(),
                })?;

        let console = ConsoleConfig::new(self.console.enabled, self.console.colored);
        let file = FileConfig::new(self.file.enabled, PathBuf::from(self.file.path), format);

        LoggerConfig::new(console, file, self.level).map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Application information
    #[serde(default)]
    pub application: ApplicationConfig,

    /// HTTP status/control server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Job pool configuration
    #[serde(default)]
    pub pool: PoolConfig,

    /// Slurm backend configuration
    #[serde(default)]
    pub slurm: SlurmConfig,

    /// Operator control surface configuration
    #[serde(default)]
    pub control: ControlConfig,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,
}

impl Settings {
    /// Validates the loaded settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pool.validate()?;

        if self.slurm.command_timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "slurm.command_timeout_secs".to_string(),
                message: "Backend command timeout must be positive".to_string(),
            });
        }

        if self.control.runtime_file.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "control.runtime_file".to_string(),
                message: "Runtime file path cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_pool_config() -> impl Strategy<Value = PoolConfig> {
        (1usize..=64usize, 1u64..=600u64, 0u32..=10u32, 1u64..=3600u64).prop_map(
            |(max_concurrent_jobs, check_interval_secs, max_retries, report_interval_secs)| {
                PoolConfig {
                    max_concurrent_jobs,
                    check_interval_secs,
                    max_retries,
                    report_interval_secs,
                }
            },
        )
    }

    fn arb_server_config() -> impl Strategy<Value = ServerConfig> {
        (
            any::<bool>(),
            prop_oneof![
                Just("127.0.0.1".to_string()),
                Just("0.0.0.0".to_string()),
                Just("localhost".to_string()),
            ],
            1u16..=65535u16,
            1u64..=300u64,
        )
            .prop_map(|(enabled, host, port, request_timeout)| ServerConfig {
                enabled,
                host,
                port,
                request_timeout,
            })
    }

    fn arb_settings() -> impl Strategy<Value = Settings> {
        (arb_server_config(), arb_pool_config()).prop_map(|(server, pool)| Settings {
            server,
            pool,
            ..Settings::default()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Serializing any valid Settings to TOML and deserializing it back
        /// produces an equivalent Settings instance.
        #[test]
        fn prop_settings_round_trip_serialization(settings in arb_settings()) {
            let toml_str = toml::to_string(&settings)
                .expect("Settings should serialize to TOML");

            let deserialized: Settings = toml::from_str(&toml_str)
                .expect("TOML should deserialize back to Settings");

            prop_assert_eq!(settings, deserialized);
        }
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 7070);
        assert_eq!(config.address(), "127.0.0.1:7070");
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_concurrent_jobs, 4);
        assert_eq!(config.check_interval_secs, 60);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.report_interval_secs, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_config_rejects_zero_capacity() {
        let config = PoolConfig {
            max_concurrent_jobs: 0,
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError { field, .. }) = result {
            assert_eq!(field, "pool.max_concurrent_jobs");
        } else {
            panic!("Expected ValidationError");
        }
    }

    #[test]
    fn test_pool_config_rejects_zero_interval() {
        let config = PoolConfig {
            check_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_slurm_config_defaults() {
        let config = SlurmConfig::default();
        assert_eq!(config.sbatch, "sbatch");
        assert_eq!(config.squeue, "squeue");
        assert_eq!(config.sacct, "sacct");
        assert_eq!(config.scancel, "scancel");
        assert_eq!(config.command_timeout_secs, 30);
        assert_eq!(config.script_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_settings_deserialize_partial() {
        let toml_str = r#"
            [application]
            name = "my-pool"

            [pool]
            max_concurrent_jobs = 8
        "#;

        let settings: Settings = toml::from_str(toml_str).expect("Failed to deserialize");
        assert_eq!(settings.application.name, "my-pool");
        assert_eq!(settings.pool.max_concurrent_jobs, 8);
        assert_eq!(settings.pool.max_retries, 3); // default
        assert_eq!(settings.server.port, 7070); // default
    }

    #[test]
    fn test_settings_deserialize_full() {
        let toml_str = r#"
            [application]
            name = "cluster-pool"
            version = "1.0.0"

            [server]
            enabled = true
            host = "0.0.0.0"
            port = 8080
            request_timeout = 60

            [pool]
            max_concurrent_jobs = 16
            check_interval_secs = 30
            max_retries = 5
            report_interval_secs = 120

            [slurm]
            sbatch = "/usr/local/bin/sbatch"
            command_timeout_secs = 10
            script_dir = "/var/lib/gridpool/scripts"

            [control]
            runtime_file = "/run/gridpool.json"

            [logger]
            level = "debug"

            [logger.file]
            enabled = true
            path = "logs/pool.log"
            format = "json"
        "#;

        let settings: Settings = toml::from_str(toml_str).expect("Failed to deserialize");

        assert_eq!(settings.application.name, "cluster-pool");
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.pool.max_concurrent_jobs, 16);
        assert_eq!(settings.pool.check_interval_secs, 30);
        assert_eq!(settings.slurm.sbatch, "/usr/local/bin/sbatch");
        assert_eq!(
            settings.slurm.script_dir(),
            PathBuf::from("/var/lib/gridpool/scripts")
        );
        assert_eq!(settings.control.runtime_file, "/run/gridpool.json");
        assert_eq!(settings.logger.level, "debug");
        assert!(settings.logger.file.enabled);
        assert_eq!(settings.logger.file.format, "json");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_logger_settings_into_logger_config() {
        let settings = LoggerSettings {
            level: "debug".to_string(),
            console: ConsoleSettings {
                enabled: true,
                colored: false,
            },
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                format: "json".to_string(),
            },
        };
        let config = settings.into_logger_config().expect("Should convert");
        assert_eq!(config.level, "debug");
        assert!(!config.console.colored);
        assert!(config.file.enabled);
        assert_eq!(config.file.format, LogFormat::Json);
    }

    #[test]
    fn test_logger_settings_invalid_format() {
        let settings = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = settings.into_logger_config();
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError { field, .. }) = result {
            assert_eq!(field, "logger.file.format");
        } else {
            panic!("Expected ValidationError");
        }
    }

    #[test]
    fn test_settings_validate_rejects_empty_runtime_file() {
        let settings = Settings {
            control: ControlConfig {
                runtime_file: String::new(),
            },
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
