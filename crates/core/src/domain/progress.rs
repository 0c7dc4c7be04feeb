// Progress Reporter - maps job state to what the operator sees
// Pure: no network, no timers

use crate::domain::job::{Job, JobState};
use serde::Serialize;

/// Synthetic progress shown while the server has not started the job
pub const PENDING_PROGRESS: u8 = 5;

pub const PENDING_TEXT: &str = "waiting";
pub const PROCESSING_TEXT: &str = "processing";
pub const SUCCESS_TEXT: &str = "completed";
pub const FAILURE_TEXT: &str = "processing failed";
pub const TIMEOUT_TEXT: &str = "timed out";

/// Displayable progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressView {
    pub percent: u8,
    pub text: String,
}

impl ProgressView {
    fn new(percent: u8, text: impl Into<String>) -> Self {
        Self {
            percent,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for ProgressView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}%", self.text, self.percent)
    }
}

pub struct ProgressReporter;

impl ProgressReporter {
    /// Map `(state, server progress, server status text)` to a display value
    ///
    /// | state      | percent                      | text                          |
    /// |------------|------------------------------|-------------------------------|
    /// | PENDING    | 5                            | "waiting"                     |
    /// | PROCESSING | server value, rounded (0)    | server text or "processing"   |
    /// | SUCCESS    | 100                          | "completed"                   |
    /// | FAILURE    | 0                            | server text or generic text   |
    /// | TIMEOUT    | 0                            | "timed out"                   |
    pub fn render(
        state: JobState,
        server_progress: Option<f64>,
        status_message: Option<&str>,
    ) -> ProgressView {
        let message = status_message.map(str::trim).filter(|m| !m.is_empty());

        match state {
            JobState::Pending => ProgressView::new(PENDING_PROGRESS, PENDING_TEXT),
            JobState::Processing => ProgressView::new(
                Self::normalize(server_progress),
                message.unwrap_or(PROCESSING_TEXT),
            ),
            JobState::Success => ProgressView::new(100, SUCCESS_TEXT),
            JobState::Failure => ProgressView::new(0, message.unwrap_or(FAILURE_TEXT)),
            JobState::Timeout => ProgressView::new(0, TIMEOUT_TEXT),
        }
    }

    /// Render the current record of a tracked job
    pub fn for_job(job: &Job) -> ProgressView {
        Self::render(
            job.state,
            Some(f64::from(job.progress)),
            job.status_message.as_deref(),
        )
    }

    /// Round and clamp a server percentage into 0..=100 (absent or NaN is 0)
    pub fn normalize(raw: Option<f64>) -> u8 {
        match raw {
            Some(value) if value.is_finite() => value.round().clamp(0.0, 100.0) as u8,
            _ => 0,
        }
    }
}
