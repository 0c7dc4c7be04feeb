// Upload Submission Use Case

use crate::application::error_reporter::ErrorReporter;
use crate::domain::{download_reference, CompletedJob, ErrorReport, Job};
use crate::error::{AppError, GENERIC_SUBMISSION_FAILURE};
use crate::port::{JobService, StatusDisplay, SubmissionReceipt, TimeProvider, UploadRequest};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Result of a successful submission
#[derive(Debug, Clone)]
pub enum Submission {
    /// Accepted as an asynchronous job; tracking starts from `Pending`
    Queued(Job),
    /// Processed synchronously by the server; nothing to track
    Completed(CompletedJob),
}

/// A submission that failed and has already been surfaced to the operator
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SubmissionFailure {
    #[source]
    pub error: AppError,
    pub report: ErrorReport,
}

/// Issues the job-creation request and extracts the job handle
pub struct UploadSubmitter {
    service: Arc<dyn JobService>,
    display: Arc<dyn StatusDisplay>,
    reporter: Arc<ErrorReporter>,
    time_provider: Arc<dyn TimeProvider>,
    base_url: String,
    max_attempts: u32,
}

impl UploadSubmitter {
    pub fn new(
        service: Arc<dyn JobService>,
        display: Arc<dyn StatusDisplay>,
        reporter: Arc<ErrorReporter>,
        time_provider: Arc<dyn TimeProvider>,
        base_url: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            service,
            display,
            reporter,
            time_provider,
            base_url: base_url.into(),
            max_attempts,
        }
    }

    /// Send one creation request
    ///
    /// The submit control is disabled while the request is in flight. Every
    /// failure is reported immediately; no job is created and no polling begins.
    pub async fn submit(
        &self,
        upload: &UploadRequest,
    ) -> std::result::Result<Submission, SubmissionFailure> {
        let origin_url = format!("{}/upload", self.base_url.trim_end_matches('/'));
        self.display.set_submit_enabled(false);

        info!(
            file = %upload.video.file_name,
            secondary = upload.video2.as_ref().map(|f| f.file_name.as_str()).unwrap_or("-"),
            url = %origin_url,
            "Submitting upload"
        );

        let outcome = match self.service.submit(upload).await {
            Ok(receipt) => self.interpret(receipt),
            Err(e) => Err(e),
        };

        outcome.map_err(|error| {
            let report = self.reporter.report_error(&error, Some(&origin_url));
            SubmissionFailure { error, report }
        })
    }

    fn interpret(&self, receipt: SubmissionReceipt) -> crate::Result<Submission> {
        if !receipt.success {
            return Err(AppError::SubmissionRejected {
                status: None,
                message: non_empty(receipt.error)
                    .unwrap_or_else(|| GENERIC_SUBMISSION_FAILURE.to_string()),
                server_error_id: receipt.error_id,
            });
        }

        if let Some(job_id) = non_empty(receipt.job_id) {
            let job = Job::new(
                job_id,
                non_empty(receipt.output_filename),
                self.max_attempts,
                self.time_provider.now_millis(),
            );
            info!(job_id = %job.id, "Upload accepted, job queued");
            return Ok(Submission::Queued(job));
        }

        // Direct mode: the server finished the work before answering
        let filename = non_empty(receipt.filename).or_else(|| non_empty(receipt.output_filename));
        if let Some(filename) = filename {
            let download_url = match non_empty(receipt.download_url) {
                Some(url) => self.resolve(&url),
                None => download_reference(&self.base_url, &filename),
            };
            info!(filename = %filename, "Upload processed synchronously");
            return Ok(Submission::Completed(CompletedJob {
                job_id: None,
                filename,
                download_url,
            }));
        }

        Err(AppError::SubmissionRejected {
            status: None,
            message: non_empty(receipt.error).unwrap_or_else(|| {
                "The server accepted the upload but returned no job id".to_string()
            }),
            server_error_id: receipt.error_id,
        })
    }

    /// Server-relative links (`/download/..`) are anchored at the base URL
    fn resolve(&self, url: &str) -> String {
        if url.starts_with('/') {
            format!("{}{}", self.base_url.trim_end_matches('/'), url)
        } else {
            url.to_string()
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnvironmentInfo, JobState};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_service::mocks::{ScriptedJobService, ScriptedSubmission};
    use crate::port::status_display::mocks::{DisplayEvent, RecordingDisplay};
    use crate::port::time_provider::mocks::FixedTimeProvider;
    use crate::port::MediaFile;

    const BASE_URL: &str = "http://localhost:5000";

    fn setup(
        service: ScriptedJobService,
    ) -> (UploadSubmitter, Arc<ScriptedJobService>, Arc<RecordingDisplay>) {
        let service = Arc::new(service);
        let display = Arc::new(RecordingDisplay::new());
        let time_provider = Arc::new(FixedTimeProvider::new(42_000));
        let reporter = Arc::new(ErrorReporter::new(
            display.clone(),
            time_provider.clone(),
            Arc::new(SequentialIdProvider::new("err")),
            EnvironmentInfo::current(BASE_URL),
        ));
        let submitter = UploadSubmitter::new(
            service.clone(),
            display.clone(),
            reporter,
            time_provider,
            BASE_URL,
            300,
        );
        (submitter, service, display)
    }

    fn upload() -> UploadRequest {
        UploadRequest::new(MediaFile::from_path("/videos/main.mp4"))
            .with_secondary(MediaFile::from_path("/videos/extra.mp4"))
    }

    #[tokio::test]
    async fn test_accepted_upload_creates_pending_job() {
        let (submitter, service, display) =
            setup(ScriptedJobService::new().accepting("job-7", "output_7.mp4"));

        let submission = submitter.submit(&upload()).await.unwrap();
        let Submission::Queued(job) = submission else {
            panic!("expected a queued job");
        };

        assert_eq!(job.id, "job-7");
        assert_eq!(job.output_filename.as_deref(), Some("output_7.mp4"));
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.attempt, 0);
        assert_eq!(job.max_attempts, 300);
        assert_eq!(job.submitted_at, 42_000);
        assert_eq!(service.submit_calls(), 1);
        // Control stays disabled while the job is tracked
        assert_eq!(display.events(), vec![DisplayEvent::SubmitEnabled(false)]);
    }

    #[tokio::test]
    async fn test_rejected_body_surfaces_server_message() {
        let (submitter, _service, display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::Receipt(SubmissionReceipt {
                success: false,
                error: Some("file too large".to_string()),
                ..Default::default()
            }),
        ));

        let failure = submitter.submit(&upload()).await.unwrap_err();
        assert!(matches!(failure.error, AppError::SubmissionRejected { .. }));
        assert!(failure.report.message.contains("file too large"));

        let errors = display.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("file too large"));
        assert_eq!(
            errors[0].diagnostic.origin_url.as_deref(),
            Some("http://localhost:5000/upload")
        );
        assert_eq!(display.submit_enabled(), Some(true));
    }

    #[tokio::test]
    async fn test_rejected_body_without_message_uses_fallback() {
        let (submitter, _service, _display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::Receipt(SubmissionReceipt::default()),
        ));

        let failure = submitter.submit(&upload()).await.unwrap_err();
        assert_eq!(failure.report.message, GENERIC_SUBMISSION_FAILURE);
    }

    #[tokio::test]
    async fn test_network_failure_is_reported() {
        let (submitter, _service, display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::NetworkFailure("connection refused".to_string()),
        ));

        let failure = submitter.submit(&upload()).await.unwrap_err();
        assert_eq!(failure.error.kind(), "SubmissionNetworkError");
        assert_eq!(display.errors().len(), 1);
        assert_eq!(
            display.errors()[0].diagnostic.error.as_deref(),
            Some("Submission network error: connection refused")
        );
    }

    #[tokio::test]
    async fn test_http_rejection_is_reported() {
        let (submitter, _service, display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::Rejected {
                status: 400,
                message: "unsupported format".to_string(),
            },
        ));

        let failure = submitter.submit(&upload()).await.unwrap_err();
        assert_eq!(failure.error.http_status(), Some(400));
        assert_eq!(display.errors()[0].message, "unsupported format");
    }

    #[tokio::test]
    async fn test_success_without_job_id_is_rejected() {
        let (submitter, _service, _display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::Receipt(SubmissionReceipt {
                success: true,
                ..Default::default()
            }),
        ));

        let failure = submitter.submit(&upload()).await.unwrap_err();
        assert!(failure.report.message.contains("no job id"));
    }

    #[tokio::test]
    async fn test_direct_mode_completes_without_job() {
        let (submitter, _service, display) = setup(ScriptedJobService::new().with_submission(
            ScriptedSubmission::Receipt(SubmissionReceipt {
                success: true,
                download_url: Some("/download/output_9.mp4".to_string()),
                filename: Some("output_9.mp4".to_string()),
                ..Default::default()
            }),
        ));

        let submission = submitter.submit(&upload()).await.unwrap();
        let Submission::Completed(done) = submission else {
            panic!("expected a completed submission");
        };
        assert_eq!(done.job_id, None);
        assert_eq!(done.filename, "output_9.mp4");
        assert_eq!(done.download_url, "http://localhost:5000/download/output_9.mp4");
        assert!(display.errors().is_empty());
    }
}
