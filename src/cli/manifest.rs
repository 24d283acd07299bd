//! Job manifest loading
//!
//! A manifest is a TOML file listing the jobs a run should execute, in
//! submission order:
//!
//! ```toml
//! [[job]]
//! id = "render_barn"
//! script_path = "render.py"
//! partition = "gpu"
//!
//! [job.args]
//! scene = "barn"
//! ```
//!
//! Every field except `id` and `script_path` carries a default, so a
//! minimal entry only names what to run.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::pool::JobSpec;

/// One manifest entry: a job id plus its resource spec
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    pub id: String,
    #[serde(flatten)]
    pub spec: JobSpec,
}

/// Ordered list of jobs to run
#[derive(Debug, Clone, Deserialize)]
pub struct JobManifest {
    #[serde(default, rename = "job")]
    pub jobs: Vec<ManifestEntry>,
}

impl JobManifest {
    /// Load and validate a manifest file
    pub fn load(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AppError::Configuration {
            key: format!("manifest file {}", path.display()),
            source: anyhow::Error::from(e),
        })?;
        Self::parse(&contents)
    }

    /// Parse and validate manifest contents
    pub fn parse(contents: &str) -> AppResult<Self> {
        let manifest: Self = toml::from_str(contents).map_err(|e| AppError::Validation {
            field: "manifest".to_string(),
            reason: e.to_string(),
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check the manifest names at least one job, ids are unique and
    /// non-empty, and every spec is submittable.
    fn validate(&self) -> AppResult<()> {
        if self.jobs.is_empty() {
            return Err(AppError::Validation {
                field: "manifest".to_string(),
                reason: "manifest names no jobs".to_string(),
            });
        }

        let mut seen = BTreeSet::new();
        for entry in &self.jobs {
            if entry.id.is_empty() {
                return Err(AppError::Validation {
                    field: "id".to_string(),
                    reason: "job id cannot be empty".to_string(),
                });
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(AppError::DuplicateJob {
                    id: entry.id.clone(),
                });
            }
            entry.spec.validate()?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MANIFEST: &str = r#"
        [[job]]
        id = "render_barn"
        script_path = "render.py"
        partition = "gpu"
        num_cpus = 8
        memory = "32G"

        [job.args]
        scene = "barn"
        samples = "512"

        [[job]]
        id = "render_lake"
        script_path = "render.py"
    "#;

    #[test]
    fn test_parse_preserves_manifest_order() {
        let manifest = JobManifest::parse(MANIFEST).unwrap();
        let ids: Vec<&str> = manifest.jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["render_barn", "render_lake"]);
    }

    #[test]
    fn test_parse_applies_spec_defaults() {
        let manifest = JobManifest::parse(MANIFEST).unwrap();
        let barn = &manifest.jobs[0].spec;
        assert_eq!(barn.partition, "gpu");
        assert_eq!(barn.num_cpus, 8);
        assert_eq!(barn.args.get("scene").map(String::as_str), Some("barn"));

        let lake = &manifest.jobs[1].spec;
        assert_eq!(lake.partition, "default");
        assert_eq!(lake.memory, "16G");
        assert!(lake.args.is_empty());
    }

    #[test]
    fn test_parse_rejects_empty_manifest() {
        let result = JobManifest::parse("");
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_parse_rejects_duplicate_ids() {
        let contents = r#"
            [[job]]
            id = "a"
            script_path = "a.py"

            [[job]]
            id = "a"
            script_path = "b.py"
        "#;
        let result = JobManifest::parse(contents);
        assert!(matches!(result, Err(AppError::DuplicateJob { .. })));
    }

    #[test]
    fn test_parse_rejects_invalid_spec() {
        let contents = r#"
            [[job]]
            id = "a"
            script_path = "a.py"
            num_cpus = 0
        "#;
        let result = JobManifest::parse(contents);
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_parse_rejects_malformed_toml() {
        let result = JobManifest::parse("[[job]\nid =");
        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", MANIFEST).unwrap();
        let manifest = JobManifest::load(file.path()).unwrap();
        assert_eq!(manifest.jobs.len(), 2);
    }

    #[test]
    fn test_load_missing_file_is_configuration_error() {
        let result = JobManifest::load(Path::new("/nonexistent/jobs.toml"));
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
