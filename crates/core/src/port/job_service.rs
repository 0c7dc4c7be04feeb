// Job Service Port (remote processing service)

use crate::domain::JobId;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// One file part of the multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub file_name: String,
    pub content_type: Option<String>,
}

impl MediaFile {
    /// Name the part after the file on disk
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        Self {
            path: path.to_path_buf(),
            file_name,
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Prepared upload: required primary video, optional secondary video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub video: MediaFile,
    pub video2: Option<MediaFile>,
}

impl UploadRequest {
    pub fn new(video: MediaFile) -> Self {
        Self { video, video2: None }
    }

    pub fn with_secondary(mut self, video2: MediaFile) -> Self {
        self.video2 = Some(video2);
        self
    }
}

/// Body of a submission response the server answered with 2xx
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub job_id: Option<JobId>,
    pub output_filename: Option<String>,
    /// Present when the server processed the upload synchronously
    pub download_url: Option<String>,
    pub filename: Option<String>,
    pub error: Option<String>,
    pub error_id: Option<String>,
}

/// Server-reported job state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteState {
    Pending,
    Processing,
    Success,
    Failure,
    /// Anything else the server may send; handled like a failure
    Unrecognized,
}

impl RemoteState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "PENDING" => RemoteState::Pending,
            "PROCESSING" => RemoteState::Processing,
            "SUCCESS" => RemoteState::Success,
            "FAILURE" => RemoteState::Failure,
            _ => RemoteState::Unrecognized,
        }
    }
}

/// Body of a status response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    /// Raw state string as sent by the server
    pub state: String,
    pub progress: Option<f64>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub error_id: Option<String>,
    /// Server-side artifact path from the task result, if reported
    pub output_path: Option<String>,
}

impl StatusReport {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            ..Default::default()
        }
    }

    pub fn pending() -> Self {
        Self::new("PENDING")
    }

    pub fn processing(progress: f64, status: impl Into<String>) -> Self {
        Self::new("PROCESSING")
            .with_progress(progress)
            .with_status(status)
    }

    pub fn success() -> Self {
        Self::new("SUCCESS").with_progress(100.0)
    }

    pub fn failure(status: impl Into<String>) -> Self {
        Self::new("FAILURE").with_status(status)
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn remote_state(&self) -> RemoteState {
        RemoteState::parse(&self.state)
    }

    /// Artifact name derived from `output_path`
    pub fn output_filename(&self) -> Option<String> {
        self.output_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Remote processing service interface
#[async_trait]
pub trait JobService: Send + Sync {
    /// Send the job-creation request
    ///
    /// # Errors
    /// - AppError::SubmissionNetwork if no response was received
    /// - AppError::SubmissionRejected if the server answered with a non-success status
    /// - AppError::Io if an upload file cannot be read
    async fn submit(&self, upload: &UploadRequest) -> Result<SubmissionReceipt>;

    /// Query the state of a job once
    ///
    /// # Errors
    /// - AppError::PollTransport on any transport or HTTP-level failure
    async fn status(&self, job_id: &str) -> Result<StatusReport>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted submission outcome
    #[derive(Debug, Clone)]
    pub enum ScriptedSubmission {
        Receipt(SubmissionReceipt),
        NetworkFailure(String),
        Rejected { status: u16, message: String },
    }

    /// Scripted status outcome
    #[derive(Debug, Clone)]
    pub enum ScriptedStatus {
        Report(StatusReport),
        TransportFailure(String),
    }

    /// Job service that replays scripted responses and counts calls
    pub struct ScriptedJobService {
        submissions: Mutex<VecDeque<ScriptedSubmission>>,
        statuses: Mutex<VecDeque<ScriptedStatus>>,
        fallback: Mutex<Option<ScriptedStatus>>,
        submit_calls: AtomicUsize,
        status_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl Default for ScriptedJobService {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ScriptedJobService {
        pub fn new() -> Self {
            Self {
                submissions: Mutex::new(VecDeque::new()),
                statuses: Mutex::new(VecDeque::new()),
                fallback: Mutex::new(None),
                submit_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        pub fn with_submission(self, submission: ScriptedSubmission) -> Self {
            self.submissions.lock().unwrap().push_back(submission);
            self
        }

        /// Accept the upload as an async job
        pub fn accepting(self, job_id: &str, output_filename: &str) -> Self {
            self.with_submission(ScriptedSubmission::Receipt(SubmissionReceipt {
                success: true,
                job_id: Some(job_id.to_string()),
                output_filename: Some(output_filename.to_string()),
                ..Default::default()
            }))
        }

        pub fn with_status(self, report: StatusReport) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .push_back(ScriptedStatus::Report(report));
            self
        }

        pub fn with_transport_failure(self, message: &str) -> Self {
            self.statuses
                .lock()
                .unwrap()
                .push_back(ScriptedStatus::TransportFailure(message.to_string()));
            self
        }

        /// Response replayed once the scripted queue is drained
        pub fn then_forever(self, report: StatusReport) -> Self {
            *self.fallback.lock().unwrap() = Some(ScriptedStatus::Report(report));
            self
        }

        pub fn submit_calls(&self) -> usize {
            self.submit_calls.load(Ordering::SeqCst)
        }

        pub fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }

        /// Highest number of status queries observed in flight at once
        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JobService for ScriptedJobService {
        async fn submit(&self, _upload: &UploadRequest) -> Result<SubmissionReceipt> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);

            let next = self.submissions.lock().unwrap().pop_front();
            match next {
                Some(ScriptedSubmission::Receipt(receipt)) => Ok(receipt),
                Some(ScriptedSubmission::NetworkFailure(msg)) => {
                    Err(AppError::SubmissionNetwork(msg))
                }
                Some(ScriptedSubmission::Rejected { status, message }) => {
                    Err(AppError::SubmissionRejected {
                        status: Some(status),
                        message,
                        server_error_id: None,
                    })
                }
                None => Err(AppError::SubmissionNetwork(
                    "no scripted submission".to_string(),
                )),
            }
        }

        async fn status(&self, job_id: &str) -> Result<StatusReport> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);

            // Yield so an overlapping query would be observable
            tokio::task::yield_now().await;

            let next = {
                let scripted = self.statuses.lock().unwrap().pop_front();
                scripted.or_else(|| self.fallback.lock().unwrap().clone())
            };
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match next {
                Some(ScriptedStatus::Report(report)) => Ok(report),
                Some(ScriptedStatus::TransportFailure(message)) => Err(AppError::PollTransport {
                    job_id: job_id.to_string(),
                    status: None,
                    message,
                }),
                None => Err(AppError::PollTransport {
                    job_id: job_id.to_string(),
                    status: None,
                    message: "no scripted status".to_string(),
                }),
            }
        }
    }
}
