// Error Reporter - sink of every failure path
//
// Presents the human message, keeps the diagnostic payload as secondary
// detail, logs it for out-of-band debugging and re-enables submission.

use crate::domain::{Diagnostic, EnvironmentInfo, ErrorReport};
use crate::error::AppError;
use crate::port::{IdProvider, StatusDisplay, TimeProvider};
use std::sync::Arc;
use tracing::error;

pub struct ErrorReporter {
    display: Arc<dyn StatusDisplay>,
    time_provider: Arc<dyn TimeProvider>,
    id_provider: Arc<dyn IdProvider>,
    environment: EnvironmentInfo,
}

impl ErrorReporter {
    pub fn new(
        display: Arc<dyn StatusDisplay>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        environment: EnvironmentInfo,
    ) -> Self {
        Self {
            display,
            time_provider,
            id_provider,
            environment,
        }
    }

    /// Surface a failure. Never fails.
    ///
    /// # Arguments
    /// * `message` - Operator-facing text, shown prominently
    /// * `cause` - Originating error, kept in the diagnostic payload
    /// * `origin_url` - Endpoint the failure came from, if any
    pub fn report(
        &self,
        message: impl Into<String>,
        cause: Option<&AppError>,
        origin_url: Option<&str>,
    ) -> ErrorReport {
        let report = ErrorReport {
            message: message.into(),
            diagnostic: Diagnostic {
                error_id: self.id_provider.generate_id(),
                kind: cause.map(|e| e.kind().to_string()),
                error: cause.map(|e| e.to_string()),
                http_status: cause.and_then(AppError::http_status),
                server_error_id: cause.and_then(|e| e.server_error_id().map(str::to_string)),
                timestamp: self.time_provider.now_rfc3339(),
                origin_url: origin_url.map(str::to_string),
                environment: self.environment.clone(),
            },
        };

        error!(
            error_id = %report.diagnostic.error_id,
            kind = report.diagnostic.kind.as_deref().unwrap_or("Unclassified"),
            origin_url = report.diagnostic.origin_url.as_deref().unwrap_or("-"),
            user_message = %report.message,
            details = %report.details_json(),
            "Error reported"
        );

        self.display.show_error(&report);
        self.display.set_submit_enabled(true);

        report
    }

    /// Surface an error using its own operator-facing message
    pub fn report_error(&self, err: &AppError, origin_url: Option<&str>) -> ErrorReport {
        self.report(err.user_message(), Some(err), origin_url)
    }
}
