// Central Error Type for the Application

use thiserror::Error;

/// Fallback when the server rejects an upload without saying why
pub const GENERIC_SUBMISSION_FAILURE: &str = "The server could not process the video";

/// Fallback when the server reports a failed job without a message
pub const GENERIC_JOB_FAILURE: &str = "Video processing failed";

/// Application-level error type
///
/// The first five variants are the tracking-session taxonomy. Each one ends
/// the current session and is surfaced through the error reporter.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Submission network error: {0}")]
    SubmissionNetwork(String),

    #[error("Submission rejected{}: {message}", fmt_status(.status))]
    SubmissionRejected {
        status: Option<u16>,
        message: String,
        server_error_id: Option<String>,
    },

    #[error("Status query failed for job {job_id}{}: {message}", fmt_status(.status))]
    PollTransport {
        job_id: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Job {job_id} failed: {message}")]
    JobReportedFailure {
        job_id: String,
        message: String,
        server_error_id: Option<String>,
    },

    #[error("Tracking timed out for job {job_id} after {attempts} status queries")]
    TrackingTimeout { job_id: String, attempts: u32 },

    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl AppError {
    /// Stable taxonomy name, used in diagnostics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::SubmissionNetwork(_) => "SubmissionNetworkError",
            AppError::SubmissionRejected { .. } => "SubmissionRejected",
            AppError::PollTransport { .. } => "PollTransportError",
            AppError::JobReportedFailure { .. } => "JobReportedFailure",
            AppError::TrackingTimeout { .. } => "TrackingTimeout",
            AppError::Domain(_) => "DomainError",
            AppError::Io(_) => "IoError",
            AppError::Serialization(_) => "SerializationError",
            AppError::Config(_) => "ConfigError",
        }
    }

    /// Operator-facing text. Server-provided text is kept verbatim.
    pub fn user_message(&self) -> String {
        match self {
            AppError::SubmissionNetwork(_) => {
                "Could not connect to the processing server".to_string()
            }
            AppError::SubmissionRejected { message, .. } => message.clone(),
            AppError::PollTransport { .. } => {
                "Lost contact with the server while tracking the job".to_string()
            }
            AppError::JobReportedFailure { message, .. } => message.clone(),
            AppError::TrackingTimeout { .. } => {
                "Processing timed out. Please try again.".to_string()
            }
            AppError::Io(e) => format!("Could not read the upload: {}", e),
            other => other.to_string(),
        }
    }

    /// Error identifier assigned by the server, if it sent one
    pub fn server_error_id(&self) -> Option<&str> {
        match self {
            AppError::SubmissionRejected {
                server_error_id, ..
            }
            | AppError::JobReportedFailure {
                server_error_id, ..
            } => server_error_id.as_deref(),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            AppError::SubmissionRejected { status, .. }
            | AppError::PollTransport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display_includes_status() {
        let err = AppError::SubmissionRejected {
            status: Some(400),
            message: "file too large".to_string(),
            server_error_id: None,
        };
        assert_eq!(err.to_string(), "Submission rejected (HTTP 400): file too large");
        assert_eq!(err.user_message(), "file too large");
        assert_eq!(err.kind(), "SubmissionRejected");
        assert_eq!(err.http_status(), Some(400));
    }

    #[test]
    fn test_poll_transport_without_status() {
        let err = AppError::PollTransport {
            job_id: "abc".to_string(),
            status: None,
            message: "connection reset".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Status query failed for job abc: connection reset"
        );
        assert_eq!(err.kind(), "PollTransportError");
    }

    #[test]
    fn test_job_failure_keeps_server_text_and_id() {
        let err = AppError::JobReportedFailure {
            job_id: "abc".to_string(),
            message: "codec error".to_string(),
            server_error_id: Some("1a2b3c4d".to_string()),
        };
        assert_eq!(err.user_message(), "codec error");
        assert_eq!(err.server_error_id(), Some("1a2b3c4d"));
    }

    #[test]
    fn test_timeout_message() {
        let err = AppError::TrackingTimeout {
            job_id: "abc".to_string(),
            attempts: 300,
        };
        assert!(err.user_message().contains("timed out"));
        assert!(err.to_string().contains("300"));
    }
}
