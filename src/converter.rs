//! Conversion orchestration
//!
//! Drives one request through the vendor: create the job, upload the source
//! file to the import task's signed form, poll the job until it reaches a
//! terminal status, then read the export task's download URL. Every step runs
//! sequentially and nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, error, info};

use crate::config::PollingConfig;
use crate::formats::FormatPolicy;
use crate::types::{AppError, AppResult};
use crate::upload::ConversionRequest;
use crate::vendor::{ConversionBackend, Job, JobStatus};

/// Bounds on the job status loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
            timeout: Duration::from_secs(900),
        }
    }
}

impl From<&PollingConfig> for PollPolicy {
    fn from(config: &PollingConfig) -> Self {
        Self {
            interval: config.interval(),
            max_attempts: config.max_attempts.max(1),
            timeout: config.timeout(),
        }
    }
}

pub struct ConversionService {
    backend: Arc<dyn ConversionBackend>,
    formats: FormatPolicy,
    polling: PollPolicy,
}

impl ConversionService {
    pub fn new(backend: Arc<dyn ConversionBackend>, formats: FormatPolicy, polling: PollPolicy) -> Self {
        Self {
            backend,
            formats,
            polling,
        }
    }

    pub fn formats(&self) -> &FormatPolicy {
        &self.formats
    }

    /// Run the full conversion and return the vendor's download URL.
    pub async fn convert(&self, request: &ConversionRequest) -> AppResult<String> {
        self.formats
            .validate(&request.input_format, &request.output_format)?;

        let job = self.backend.create_job(&request.output_format).await?;
        info!(job_id = %job.id, "Created conversion job {} -> {}", request.input_format, request.output_format);

        let form = job
            .upload_form()
            .ok_or_else(|| AppError::Remote(format!("Job {} has no upload form", job.id)))?;
        debug!(job_id = %job.id, upload_url = %form.url, "Received upload form");

        self.backend
            .upload_file(form, request.path(), &request.original_filename)
            .await?;
        info!(job_id = %job.id, "Uploaded {}", request.original_filename);

        let job = self.wait_for_job(&job.id).await?;

        if job.status == JobStatus::Error {
            for task in job.failed_tasks() {
                error!(
                    job_id = %job.id,
                    task = %task.name,
                    code = ?task.code,
                    "Conversion task failed: {}",
                    task.message.as_deref().unwrap_or("no message")
                );
            }
            return Err(AppError::Remote(format!("Job {} ended with status error", job.id)));
        }

        let download_url = job
            .download_url()
            .ok_or_else(|| AppError::Remote(format!("Job {} finished without an exported file", job.id)))?
            .to_string();
        info!(job_id = %job.id, "Download URL: {}", download_url);

        Ok(download_url)
    }

    /// Poll until the job is terminal, bounded by attempt count and deadline.
    ///
    /// A timeout too large to represent as an instant leaves only the attempt
    /// cap in force.
    pub async fn wait_for_job(&self, job_id: &str) -> AppResult<Job> {
        let deadline = Instant::now().checked_add(self.polling.timeout);
        let timed_out = |attempts| AppError::Timeout {
            job_id: job_id.to_string(),
            attempts,
        };

        let mut attempts = 0;
        while attempts < self.polling.max_attempts {
            attempts += 1;

            let status_check = self.backend.get_job(job_id);
            let job = match deadline {
                Some(deadline) => timeout_at(deadline, status_check)
                    .await
                    .map_err(|_| timed_out(attempts))??,
                None => status_check.await?,
            };
            debug!(job_id, attempt = attempts, "Job status: {}", job.status);

            if job.status.is_terminal() {
                return Ok(job);
            }

            if let Some(deadline) = deadline {
                let next_poll = Instant::now().checked_add(self.polling.interval);
                if next_poll.map_or(true, |next| next >= deadline) {
                    break;
                }
            }
            sleep(self.polling.interval).await;
        }

        Err(timed_out(attempts))
    }
}
