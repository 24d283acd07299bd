//! Resource and execution request attached to a job

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

fn default_partition() -> String {
    "default".to_string()
}

fn default_num_cpus() -> u32 {
    1
}

fn default_num_gpus() -> u32 {
    1
}

fn default_memory() -> String {
    "16G".to_string()
}

fn default_time_limit() -> String {
    "24:00:00".to_string()
}

fn default_executor() -> String {
    "python".to_string()
}

fn default_args_separator() -> String {
    "--".to_string()
}

/// Resource and execution request for a single job.
///
/// Owned exclusively by its `JobRecord` and immutable after creation.
/// All scheduling-relevant fields carry defaults so a manifest only has
/// to name the script it wants to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Script handed to the executor
    pub script_path: PathBuf,

    /// Named arguments passed to the script after the separator
    #[serde(default)]
    pub args: BTreeMap<String, String>,

    /// Scheduler partition to submit into
    #[serde(default = "default_partition")]
    pub partition: String,

    /// Number of GPUs requested
    #[serde(default = "default_num_gpus")]
    pub num_gpus: u32,

    /// Number of CPU cores requested
    #[serde(default = "default_num_cpus")]
    pub num_cpus: u32,

    /// Memory request, e.g. "16G"
    #[serde(default = "default_memory")]
    pub memory: String,

    /// Wall-clock limit, "HH:MM:SS" or "D-HH:MM:SS"
    #[serde(default = "default_time_limit")]
    pub time_limit: String,

    /// Program that runs the script ("python", "blender", ...)
    #[serde(default = "default_executor")]
    pub executor: String,

    /// Extra arguments passed to the executor before the script
    #[serde(default)]
    pub executor_args: Vec<String>,

    /// Conda environment activated before the command runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conda_env: Option<String>,

    /// Working directory the script is launched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    /// Directory the scheduler writes the job log into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Mail events, e.g. "END,FAIL"; only emitted together with `mail_user`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_type: Option<String>,

    /// Address mail notifications go to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_user: Option<String>,

    /// Additional scheduler directives rendered as `#SBATCH --key=value`
    #[serde(default)]
    pub extra_params: BTreeMap<String, String>,

    /// Token separating executor arguments from script arguments
    #[serde(default = "default_args_separator")]
    pub script_args_separator: String,
}

impl JobSpec {
    /// Create a spec for a script with all defaults
    pub fn new<P: Into<PathBuf>>(script_path: P) -> Self {
        Self {
            script_path: script_path.into(),
            args: BTreeMap::new(),
            partition: default_partition(),
            num_gpus: default_num_gpus(),
            num_cpus: default_num_cpus(),
            memory: default_memory(),
            time_limit: default_time_limit(),
            executor: default_executor(),
            executor_args: Vec::new(),
            conda_env: None,
            working_dir: None,
            log_dir: None,
            mail_type: None,
            mail_user: None,
            extra_params: BTreeMap::new(),
            script_args_separator: default_args_separator(),
        }
    }

    /// Validate the fields a submission cannot do without
    pub fn validate(&self) -> AppResult<()> {
        if self.script_path.as_os_str().is_empty() {
            return Err(AppError::Validation {
                field: "script_path".to_string(),
                reason: "script path cannot be empty".to_string(),
            });
        }
        if self.partition.is_empty() {
            return Err(AppError::Validation {
                field: "partition".to_string(),
                reason: "partition cannot be empty".to_string(),
            });
        }
        if self.num_cpus == 0 {
            return Err(AppError::Validation {
                field: "num_cpus".to_string(),
                reason: "at least one CPU core is required".to_string(),
            });
        }
        Ok(())
    }

    /// Short human-readable resource description for status output
    pub fn resource_summary(&self) -> String {
        format!(
            "{}, {}cpu, {}gpu, {}",
            self.partition, self.num_cpus, self.num_gpus, self.memory
        )
    }
}
