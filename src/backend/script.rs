//! Batch script generation
//!
//! Renders a self-contained `#SBATCH` script from a `JobSpec`. The script
//! carries every scheduler directive so the submit command itself only
//! needs to name the file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::pool::JobSpec;

/// Render the batch script text for a job
pub fn render(job_id: &str, spec: &JobSpec) -> String {
    let mut out = String::from("#!/bin/bash\n\n");

    let _ = writeln!(out, "#SBATCH --job-name={}", job_id);
    if let Some(log_dir) = &spec.log_dir {
        let _ = writeln!(out, "#SBATCH --output={}/%x.log", log_dir.display());
    }
    let _ = writeln!(out, "#SBATCH --partition={}", spec.partition);
    out.push_str("#SBATCH --ntasks=1\n");
    let _ = writeln!(out, "#SBATCH --cpus-per-task={}", spec.num_cpus);
    let _ = writeln!(out, "#SBATCH --mem={}", spec.memory);
    let _ = writeln!(out, "#SBATCH --time={}", spec.time_limit);

    if spec.num_gpus > 0 {
        let _ = writeln!(out, "#SBATCH --gres=gpu:{}", spec.num_gpus);
    }

    if let (Some(mail_type), Some(mail_user)) = (&spec.mail_type, &spec.mail_user) {
        let _ = writeln!(out, "#SBATCH --mail-type={}", mail_type);
        let _ = writeln!(out, "#SBATCH --mail-user={}", mail_user);
    }

    for (key, value) in &spec.extra_params {
        let _ = writeln!(out, "#SBATCH --{}={}", key, value);
    }

    out.push_str("\necho \"Running on host: $(hostname)\"\n");
    out.push_str("echo \"Time is: $(date)\"\n\n");

    if let Some(working_dir) = &spec.working_dir {
        let _ = writeln!(out, "cd {}\n", working_dir.display());
    }

    if let Some(conda_env) = &spec.conda_env {
        out.push_str("source $(conda info --base)/etc/profile.d/conda.sh\n");
        let _ = writeln!(out, "conda activate {}\n", conda_env);
    }

    out.push_str(&render_command(spec));
    out.push('\n');
    out
}

/// Build the command line that actually runs the work
fn render_command(spec: &JobSpec) -> String {
    let mut cmd: Vec<String> = vec![spec.executor.clone()];

    // Blender runs the script through its own embedded interpreter
    if spec.executor.to_lowercase().contains("blender") {
        if !spec.executor_args.iter().any(|a| a == "--background") {
            cmd.push("--background".to_string());
        }
        cmd.extend(spec.executor_args.iter().cloned());
        cmd.push("--python".to_string());
        cmd.push(spec.script_path.display().to_string());
    } else {
        cmd.extend(spec.executor_args.iter().cloned());
        cmd.push(spec.script_path.display().to_string());
    }

    if !spec.args.is_empty() {
        cmd.push(spec.script_args_separator.clone());
        for (key, value) in &spec.args {
            cmd.push(format!("--{}={}", key, value));
        }
    }

    cmd.join(" ")
}

/// Write the rendered script to `dir` and make it executable
pub async fn write(dir: &Path, job_id: &str, spec: &JobSpec) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("gridpool_job_{}.sh", job_id));
    tokio::fs::write(&path, render(job_id, spec)).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).await?;
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_basic_directives() {
        let spec = JobSpec {
            partition: "gpu".to_string(),
            num_cpus: 4,
            num_gpus: 2,
            memory: "32G".to_string(),
            time_limit: "12:00:00".to_string(),
            ..JobSpec::new("train.py")
        };

        let script = render("exp_1", &spec);
        assert!(script.starts_with("#!/bin/bash\n"));
        assert!(script.contains("#SBATCH --job-name=exp_1"));
        assert!(script.contains("#SBATCH --partition=gpu"));
        assert!(script.contains("#SBATCH --cpus-per-task=4"));
        assert!(script.contains("#SBATCH --mem=32G"));
        assert!(script.contains("#SBATCH --time=12:00:00"));
        assert!(script.contains("#SBATCH --gres=gpu:2"));
        assert!(script.contains("python train.py"));
    }

    #[test]
    fn test_render_omits_gres_without_gpus() {
        let spec = JobSpec {
            num_gpus: 0,
            ..JobSpec::new("cpu_task.py")
        };
        let script = render("cpu_1", &spec);
        assert!(!script.contains("--gres"));
    }

    #[test]
    fn test_render_mail_requires_both_fields() {
        let spec = JobSpec {
            mail_type: Some("END,FAIL".to_string()),
            mail_user: None,
            ..JobSpec::new("a.py")
        };
        assert!(!render("j", &spec).contains("--mail-type"));

        let spec = JobSpec {
            mail_type: Some("END,FAIL".to_string()),
            mail_user: Some("ops@example.com".to_string()),
            ..JobSpec::new("a.py")
        };
        let script = render("j", &spec);
        assert!(script.contains("#SBATCH --mail-type=END,FAIL"));
        assert!(script.contains("#SBATCH --mail-user=ops@example.com"));
    }

    #[test]
    fn test_render_script_args_after_separator() {
        let mut args = BTreeMap::new();
        args.insert("epochs".to_string(), "10".to_string());
        args.insert("lr".to_string(), "0.001".to_string());
        let spec = JobSpec {
            args,
            ..JobSpec::new("train.py")
        };
        let script = render("j", &spec);
        assert!(script.contains("python train.py -- --epochs=10 --lr=0.001"));
    }

    #[test]
    fn test_render_conda_and_workdir() {
        let spec = JobSpec {
            conda_env: Some("ml".to_string()),
            working_dir: Some("/data/project".into()),
            ..JobSpec::new("train.py")
        };
        let script = render("j", &spec);
        assert!(script.contains("cd /data/project"));
        assert!(script.contains("conda activate ml"));
    }

    #[test]
    fn test_render_blender_executor() {
        let spec = JobSpec {
            executor: "blender".to_string(),
            ..JobSpec::new("render_scene.py")
        };
        let script = render("j", &spec);
        assert!(script.contains("blender --background --python render_scene.py"));
    }

    #[test]
    fn test_render_extra_params() {
        let mut extra = BTreeMap::new();
        extra.insert("nodelist".to_string(), "node[01-02]".to_string());
        let spec = JobSpec {
            extra_params: extra,
            ..JobSpec::new("a.py")
        };
        assert!(render("j", &spec).contains("#SBATCH --nodelist=node[01-02]"));
    }

    #[tokio::test]
    async fn test_write_creates_executable_script() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let spec = JobSpec::new("a.py");

        let path = write(temp_dir.path(), "job_1", &spec).await.unwrap();
        assert!(path.ends_with("gridpool_job_job_1.sh"));

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("#SBATCH --job-name=job_1"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = tokio::fs::metadata(&path).await.unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
