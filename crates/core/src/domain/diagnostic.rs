// Error report surfaced to the operator, plus its out-of-band diagnostic payload

use serde::Serialize;

/// Where the client is running; attached to every diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentInfo {
    pub client_version: String,
    pub os: String,
    pub arch: String,
    pub base_url: String,
}

impl EnvironmentInfo {
    /// Describe the current process
    pub fn current(base_url: impl Into<String>) -> Self {
        Self {
            client_version: crate::VERSION.to_string(),
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            base_url: base_url.into(),
        }
    }
}

/// Structured context for debugging; never required to understand the message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Client-generated identifier for correlating logs
    pub error_id: String,
    pub kind: Option<String>,
    pub error: Option<String>,
    pub http_status: Option<u16>,
    pub server_error_id: Option<String>,
    /// RFC 3339
    pub timestamp: String,
    pub origin_url: Option<String>,
    pub environment: EnvironmentInfo,
}

/// What the operator sees when a session fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub diagnostic: Diagnostic,
}

impl ErrorReport {
    /// Diagnostic payload as indented JSON, for a collapsible "details" view
    pub fn details_json(&self) -> String {
        serde_json::to_string_pretty(&self.diagnostic)
            .unwrap_or_else(|_| format!("{:?}", self.diagnostic))
    }
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [ID: {}]", self.message, self.diagnostic.error_id)
    }
}
