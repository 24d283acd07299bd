//! Runtime discovery file
//!
//! A running manager advertises itself through a small JSON file holding
//! its process id and control API address, so operator commands can find
//! it without any configuration. The file is written on startup and
//! removed on clean exit; a stale file from a crashed process is simply
//! overwritten by the next run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Contents of the runtime discovery file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeFile {
    /// Process id of the running manager
    pub pid: u32,
    /// Address the control API listens on, e.g. "127.0.0.1:7070"
    pub control_addr: String,
}

impl RuntimeFile {
    pub fn current(control_addr: impl Into<String>) -> Self {
        Self {
            pid: std::process::id(),
            control_addr: control_addr.into(),
        }
    }

    /// Write the discovery file, creating parent directories as needed
    pub fn write(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| AppError::Internal {
                    source: anyhow::Error::from(e),
                })?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })?;
        std::fs::write(path, json).map_err(|e| AppError::Internal {
            source: anyhow::Error::from(e),
        })
    }

    /// Load the discovery file written by a running manager
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|_| AppError::NotFound {
            entity: "runtime file".to_string(),
            field: "path".to_string(),
            value: path.display().to_string(),
        })?;
        serde_json::from_str(&contents).map_err(|e| AppError::BadRequest {
            message: format!("malformed runtime file {}: {}", path.display(), e),
        })
    }

    /// Base URL of the control API advertised by this file
    pub fn control_url(&self) -> String {
        format!("http://{}", self.control_addr)
    }
}

/// Remove the discovery file, ignoring a file that is already gone
pub fn remove(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove runtime file");
        }
    }
}

/// Default runtime file location from configuration
pub fn path_from(config: &crate::config::ControlConfig) -> PathBuf {
    PathBuf::from(&config.runtime_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run/gridpool.json");

        let file = RuntimeFile::current("127.0.0.1:7070");
        file.write(&path).unwrap();

        let loaded = RuntimeFile::load(&path).unwrap();
        assert_eq!(loaded, file);
        assert_eq!(loaded.control_url(), "http://127.0.0.1:7070");
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = RuntimeFile::load(&temp_dir.path().join("absent.json"));
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_load_rejects_malformed_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            RuntimeFile::load(&path),
            Err(AppError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_remove_tolerates_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        remove(&temp_dir.path().join("absent.json"));
    }
}
