//! Control command handlers
//!
//! Implements the status, resize, cancel and stop commands by talking
//! to the control API of a running pool. The pool is discovered through
//! the runtime file it writes on startup.

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::api::dto::{CancelRequest, ControlResponse, ErrorResponse, ResizeRequest};
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};
use crate::pool::{JobSummary, StatusSnapshot};
use crate::runtime::{self, RuntimeFile};

/// Handler for commands addressed to a running pool
pub struct ControlCommandHandler {
    settings: Settings,
    endpoint: Option<String>,
    client: reqwest::Client,
}

impl ControlCommandHandler {
    /// `endpoint` overrides runtime-file discovery when given
    pub fn new(settings: Settings, endpoint: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.server.request_timeout))
            .build()
            .unwrap_or_default();
        Self {
            settings,
            endpoint,
            client,
        }
    }

    /// Print the pool status, or a single job's status
    pub async fn status(&self, job: Option<&str>) -> AppResult<()> {
        let base = self.discover()?;

        match job {
            Some(id) => {
                let summary: JobSummary =
                    self.get(&format!("{}/api/jobs/{}", base, id)).await?;
                print_job_line(&summary);
            }
            None => {
                let snapshot: StatusSnapshot =
                    self.get(&format!("{}/api/status", base)).await?;
                print_snapshot(&snapshot);
            }
        }

        Ok(())
    }

    /// Change the concurrency limit of the running pool
    pub async fn resize(&self, capacity: usize) -> AppResult<()> {
        let base = self.discover()?;
        let response: ControlResponse = self
            .post(
                &format!("{}/api/pool/resize", base),
                &ResizeRequest { capacity },
            )
            .await?;
        println!("{}", response.message);
        Ok(())
    }

    /// Cancel jobs in the running pool
    pub async fn cancel(
        &self,
        ids: Vec<String>,
        pattern: Option<String>,
        all: bool,
    ) -> AppResult<()> {
        let base = self.discover()?;
        let request = CancelRequest {
            ids: if ids.is_empty() { None } else { Some(ids) },
            pattern,
            all: all.then_some(true),
        };
        let response: ControlResponse = self
            .post(&format!("{}/api/jobs/cancel", base), &request)
            .await?;
        println!("{}", response.message);
        Ok(())
    }

    /// Cancel everything and stop the running pool
    pub async fn stop(&self) -> AppResult<()> {
        let base = self.discover()?;
        let response: ControlResponse = self
            .post(&format!("{}/api/shutdown", base), &serde_json::json!({}))
            .await?;
        println!("{}", response.message);
        Ok(())
    }

    /// Locate the running pool, preferring an explicit endpoint over the
    /// runtime file it wrote on startup
    fn discover(&self) -> AppResult<String> {
        if let Some(addr) = &self.endpoint {
            return Ok(format!("http://{}", addr));
        }

        let path = runtime::path_from(&self.settings.control);
        let file = RuntimeFile::load(&path).map_err(|_| AppError::NotFound {
            entity: "running pool".to_string(),
            field: "runtime file".to_string(),
            value: path.display().to_string(),
        })?;
        Ok(file.control_url())
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;
        decode(url, response).await
    }

    async fn post<B, T>(&self, url: &str, body: &B) -> AppResult<T>
    where
        B: serde::Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(url, &e))?;
        decode(url, response).await
    }
}

fn transport_error(url: &str, error: &reqwest::Error) -> AppError {
    AppError::ControlChannel {
        message: format!("cannot reach pool at {}: {}", url, error),
    }
}

/// Decode a control API response, surfacing the server's error payload
/// on non-success statuses.
async fn decode<T: DeserializeOwned>(url: &str, response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(|e| AppError::Internal {
            source: anyhow::anyhow!("malformed response from {}: {}", url, e),
        });
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(err) => match err.details {
            Some(details) => format!("{} ({})", err.message, details),
            None => err.message,
        },
        Err(_) => format!("request failed with status {}", status),
    };
    Err(AppError::BadRequest { message })
}

fn print_snapshot(snapshot: &StatusSnapshot) {
    println!(
        "capacity {}  pending {}  active {}  completed {}  failed {}  cancelled {}",
        snapshot.capacity,
        snapshot.counts.pending,
        snapshot.counts.active,
        snapshot.counts.completed,
        snapshot.counts.failed,
        snapshot.counts.cancelled,
    );
    for job in &snapshot.jobs {
        print_job_line(job);
    }
}

fn print_job_line(job: &JobSummary) {
    let handle = job.handle.as_deref().unwrap_or("-");
    let runtime = job
        .runtime_secs
        .map(|s| format!("{}s", s))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<24} {:<10} handle={:<12} runtime={:<8} retries={} [{}]",
        job.id, job.state, handle, runtime, job.retry_count, job.resources
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_fails_without_runtime_file() {
        let mut settings = Settings::default();
        settings.control.runtime_file = "/nonexistent/gridpool.json".to_string();
        let handler = ControlCommandHandler::new(settings, None);
        assert!(matches!(
            handler.discover(),
            Err(AppError::NotFound { .. })
        ));
    }

    #[test]
    fn test_discover_reads_runtime_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("gridpool.json");
        RuntimeFile::current("127.0.0.1:7070").write(&path).unwrap();

        let mut settings = Settings::default();
        settings.control.runtime_file = path.to_string_lossy().into_owned();
        let handler = ControlCommandHandler::new(settings, None);
        assert_eq!(handler.discover().unwrap(), "http://127.0.0.1:7070");
    }

    #[test]
    fn test_explicit_endpoint_wins_over_runtime_file() {
        let mut settings = Settings::default();
        settings.control.runtime_file = "/nonexistent/gridpool.json".to_string();
        let handler =
            ControlCommandHandler::new(settings, Some("10.0.0.5:9000".to_string()));
        assert_eq!(handler.discover().unwrap(), "http://10.0.0.5:9000");
    }
}
