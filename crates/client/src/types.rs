//! Wire types of the processing service

use mediajob_core::port::{StatusReport, SubmissionReceipt};
use serde::{Deserialize, Serialize};

/// `POST /upload` response body (both queued and direct mode)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadBody {
    #[serde(default)]
    pub success: bool,
    pub job_id: Option<String>,
    pub output_filename: Option<String>,
    pub download_url: Option<String>,
    pub filename: Option<String>,
    /// `async` or `direct`
    pub mode: Option<String>,
    pub message: Option<String>,
    pub error: Option<String>,
    pub error_id: Option<String>,
}

impl From<UploadBody> for SubmissionReceipt {
    fn from(body: UploadBody) -> Self {
        SubmissionReceipt {
            success: body.success,
            job_id: body.job_id,
            output_filename: body.output_filename,
            download_url: body.download_url,
            filename: body.filename,
            error: body.error,
            error_id: body.error_id,
        }
    }
}

/// `GET /status/{job_id}` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBody {
    pub state: String,
    pub progress: Option<f64>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub error_id: Option<String>,
    /// Task result on SUCCESS; shape is not guaranteed
    pub result: Option<serde_json::Value>,
}

impl From<StatusBody> for StatusReport {
    fn from(body: StatusBody) -> Self {
        let output_path = body
            .result
            .as_ref()
            .and_then(|r| r.get("output_path"))
            .and_then(|p| p.as_str())
            .map(str::to_string);

        StatusReport {
            state: body.state,
            progress: body.progress,
            status: body.status,
            error: body.error,
            error_id: body.error_id,
            output_path,
        }
    }
}

/// Error body the service sends with non-success statuses
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
    pub error_id: Option<String>,
}

/// `GET /health` response body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub redis: Option<String>,
    #[serde(default)]
    pub celery: Option<String>,
    #[serde(default)]
    pub upload_folder: Option<String>,
    #[serde(default)]
    pub output_folder: Option<String>,
    #[serde(default)]
    pub assets: Option<AssetStatus>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }

    /// Whether jobs can be queued (otherwise the server falls back to direct mode)
    pub fn queue_connected(&self) -> bool {
        self.redis
            .as_deref()
            .is_some_and(|r| r.starts_with("connected"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetStatus {
    #[serde(default)]
    pub watermark: bool,
    #[serde(default)]
    pub outro: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_queued_upload_body() {
        let body: UploadBody = serde_json::from_value(json!({
            "success": true,
            "job_id": "3f1c",
            "status": "queued",
            "output_filename": "output_3f1c.mp4",
            "mode": "async"
        }))
        .unwrap();

        let receipt = SubmissionReceipt::from(body);
        assert!(receipt.success);
        assert_eq!(receipt.job_id.as_deref(), Some("3f1c"));
        assert_eq!(receipt.output_filename.as_deref(), Some("output_3f1c.mp4"));
        assert_eq!(receipt.download_url, None);
    }

    #[test]
    fn test_error_upload_body_defaults_success_to_false() {
        let body: UploadBody = serde_json::from_value(json!({
            "error": "unsupported format",
            "error_id": "a1b2c3d4"
        }))
        .unwrap();

        let receipt = SubmissionReceipt::from(body);
        assert!(!receipt.success);
        assert_eq!(receipt.error_id.as_deref(), Some("a1b2c3d4"));
    }

    #[test]
    fn test_status_body_extracts_output_path() {
        let body: StatusBody = serde_json::from_value(json!({
            "state": "SUCCESS",
            "status": "done",
            "progress": 100,
            "result": {"status": "completed", "output_path": "/app/outputs/output_x.mp4"}
        }))
        .unwrap();

        let report = StatusReport::from(body);
        assert_eq!(report.progress, Some(100.0));
        assert_eq!(report.output_filename().as_deref(), Some("output_x.mp4"));
    }

    #[test]
    fn test_status_body_tolerates_non_object_result() {
        let body: StatusBody = serde_json::from_value(json!({
            "state": "SUCCESS",
            "result": "ok"
        }))
        .unwrap();

        assert_eq!(StatusReport::from(body).output_path, None);
    }

    #[test]
    fn test_health_response() {
        let health: HealthResponse = serde_json::from_value(json!({
            "status": "healthy",
            "redis": "connected",
            "celery": "active_workers: 2",
            "assets": {"watermark": true, "outro": false}
        }))
        .unwrap();

        assert!(health.is_healthy());
        assert!(health.queue_connected());
        assert!(health.assets.unwrap().watermark);
    }
}
