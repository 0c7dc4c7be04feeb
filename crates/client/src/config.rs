//! Client configuration

use crate::error::{ClientError, Result};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Uploads and synchronous processing can take minutes
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(600);

/// Connection settings for the processing service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:5000`
    pub base_url: String,
    /// Timeout for status, health and download requests
    pub request_timeout: Duration,
    /// Timeout for the upload request
    pub upload_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Create config from environment variables.
    ///
    /// - `MEDIAJOB_BASE_URL`
    /// - `MEDIAJOB_REQUEST_TIMEOUT_SECS`
    /// - `MEDIAJOB_UPLOAD_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            base_url: std::env::var("MEDIAJOB_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: secs_from_env("MEDIAJOB_REQUEST_TIMEOUT_SECS")?
                .unwrap_or(defaults.request_timeout),
            upload_timeout: secs_from_env("MEDIAJOB_UPLOAD_TIMEOUT_SECS")?
                .unwrap_or(defaults.upload_timeout),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Base URL without a trailing slash
    pub fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.root(), path.trim_start_matches('/'))
    }
}

fn secs_from_env(key: &str) -> Result<Option<Duration>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|s| Some(Duration::from_secs(s)))
            .map_err(|_| {
                ClientError::InvalidConfig(format!(
                    "{key} must be a number of seconds, got {raw:?}"
                ))
            }),
        Err(_) => Ok(None),
    }
}
