//! Client Error Types

use mediajob_core::AppError;
use thiserror::Error;

/// Client Result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client Error
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response received (connect, timeout, broken body)
    #[error("Connection error: {0}")]
    Connection(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        error_id: Option<String>,
    },

    #[error("Invalid response (HTTP {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } | ClientError::InvalidResponse { status, .. } => {
                Some(*status)
            }
            ClientError::Connection(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Map a failure of the upload request onto the tracking taxonomy
    pub fn into_submission_error(self) -> AppError {
        match self {
            ClientError::Connection(e) => AppError::SubmissionNetwork(e.to_string()),
            ClientError::Http {
                status,
                message,
                error_id,
            } => AppError::SubmissionRejected {
                status: Some(status),
                message,
                server_error_id: error_id,
            },
            ClientError::InvalidResponse { status, message } => AppError::SubmissionRejected {
                status: Some(status),
                message,
                server_error_id: None,
            },
            ClientError::Io(e) => AppError::Io(e),
            ClientError::InvalidConfig(msg) => AppError::Config(msg),
        }
    }

    /// Map a failure of a status query onto the tracking taxonomy
    pub fn into_status_error(self, job_id: &str) -> AppError {
        AppError::PollTransport {
            job_id: job_id.to_string(),
            status: self.status(),
            message: match self {
                ClientError::Http { message, .. } => message,
                other => other.to_string(),
            },
        }
    }
}
