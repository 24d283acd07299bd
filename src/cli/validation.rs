//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

/// Validate that a configuration file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file(path_str, "Configuration")
}

/// Validate that a job manifest path is accessible (exists and is readable)
pub fn validate_manifest_path(path_str: &str) -> Result<PathBuf, String> {
    validate_readable_file(path_str, "Manifest")
}

fn validate_readable_file(path_str: &str, kind: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("{} file does not exist: '{}'", kind, path_str));
    }

    if !path.is_file() {
        return Err(format!("{} path is not a file: '{}'", kind, path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!("Cannot read {} file '{}': {}", kind.to_lowercase(), path_str, e)),
    }
}

/// Validate a concurrency limit is a positive integer
pub fn validate_capacity(value: &str) -> Result<usize, String> {
    let capacity: usize = value
        .parse()
        .map_err(|_| format!("Capacity must be a positive integer, got: '{}'", value))?;

    if capacity == 0 {
        return Err("Capacity must be greater than 0".to_string());
    }

    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_capacity() {
        assert_eq!(validate_capacity("8"), Ok(8));
        assert!(validate_capacity("0").is_err());
        assert!(validate_capacity("-1").is_err());
        assert!(validate_capacity("many").is_err());
    }

    #[test]
    fn test_validate_config_file_path_accepts_readable_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[pool]").unwrap();
        let path = file.path().to_string_lossy().into_owned();
        assert_eq!(validate_config_file_path(&path), Ok(file.path().to_path_buf()));
    }

    #[test]
    fn test_validate_config_file_path_rejects_missing_file() {
        let result = validate_config_file_path("/nonexistent/gridpool.toml");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_validate_manifest_path_rejects_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = validate_manifest_path(&dir.path().to_string_lossy());
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("not a file"));
    }
}
