// Job Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::progress::PENDING_PROGRESS;
use serde::{Deserialize, Serialize};

/// Opaque job handle issued by the remote service
pub type JobId = String;

/// Job State
///
/// `Pending`, `Processing`, `Success` and `Failure` are reported by the server.
/// `Timeout` is derived locally when the attempt bound is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Pending,
    Processing,
    Success,
    Failure,
    Timeout,
}

impl JobState {
    /// No status query may follow a terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Success | JobState::Failure | JobState::Timeout)
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Pending => write!(f, "PENDING"),
            JobState::Processing => write!(f, "PROCESSING"),
            JobState::Success => write!(f, "SUCCESS"),
            JobState::Failure => write!(f, "FAILURE"),
            JobState::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

/// One remote unit of work, as tracked by the client
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub output_filename: Option<String>,
    pub state: JobState,
    /// Display percentage 0-100
    pub progress: u8,
    pub status_message: Option<String>,

    /// Status queries issued so far (never exceeds `max_attempts`)
    pub attempt: u32,
    pub max_attempts: u32,

    pub submitted_at: i64, // epoch ms
    pub finished_at: Option<i64>,
}

impl Job {
    /// Create a freshly submitted job in `Pending` with no queries issued
    ///
    /// # Arguments
    ///
    /// * `id` - Handle returned by the submission endpoint
    /// * `output_filename` - Artifact name, if the server announced it at submission time
    /// * `max_attempts` - Upper bound on status queries
    /// * `submitted_at` - Submission timestamp in epoch ms (injected, not system time)
    pub fn new(
        id: impl Into<String>,
        output_filename: Option<String>,
        max_attempts: u32,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            output_filename,
            state: JobState::Pending,
            progress: 0,
            status_message: None,
            attempt: 0,
            max_attempts,
            submitted_at,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Count one status query. Refused once terminal or when the bound is spent.
    pub fn record_attempt(&mut self) -> Result<u32> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: "POLLING".to_string(),
            });
        }
        if !self.has_attempts_left() {
            return Err(DomainError::AttemptBoundReached {
                job_id: self.id.clone(),
                max_attempts: self.max_attempts,
            });
        }
        self.attempt += 1;
        Ok(self.attempt)
    }

    /// Server still queueing the job; progress is synthesized
    pub fn mark_pending(&mut self) -> Result<()> {
        self.ensure_active(JobState::Pending)?;
        self.state = JobState::Pending;
        self.progress = PENDING_PROGRESS;
        self.status_message = None;
        Ok(())
    }

    /// Adopt server-reported progress as-is (regressions included)
    pub fn mark_processing(&mut self, progress: u8, status_message: Option<String>) -> Result<()> {
        self.ensure_active(JobState::Processing)?;
        self.state = JobState::Processing;
        self.progress = progress.min(100);
        self.status_message = status_message;
        Ok(())
    }

    /// Transition to Success with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        self.ensure_active(JobState::Success)?;
        self.state = JobState::Success;
        self.progress = 100;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Transition to Failure with explicit timestamp
    pub fn fail(&mut self, now_millis: i64, status_message: Option<String>) -> Result<()> {
        self.ensure_active(JobState::Failure)?;
        self.state = JobState::Failure;
        if status_message.is_some() {
            self.status_message = status_message;
        }
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Attempt bound exhausted without a terminal server state
    pub fn time_out(&mut self, now_millis: i64) -> Result<()> {
        self.ensure_active(JobState::Timeout)?;
        self.state = JobState::Timeout;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    fn ensure_active(&self, to: JobState) -> Result<()> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        Ok(())
    }
}

/// A produced artifact ready to be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletedJob {
    /// `None` when the server processed the upload synchronously
    pub job_id: Option<JobId>,
    pub filename: String,
    pub download_url: String,
}

/// Build the download reference for an artifact (the core never fetches it)
pub fn download_reference(base_url: &str, filename: &str) -> String {
    format!(
        "{}/download/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(filename)
    )
}
