//! HTTP implementation of the job service

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::types::{ErrorBody, HealthResponse, StatusBody, UploadBody};
use async_trait::async_trait;
use mediajob_core::port::{
    JobService, MediaFile, StatusReport, SubmissionReceipt, UploadRequest,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Response};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// Processing service client
///
/// One instance can serve any number of tracking sessions; it holds no
/// per-job state.
pub struct HttpJobService {
    http: Client,
    config: ClientConfig,
}

impl HttpJobService {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("mediajob/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `POST /upload` with multipart fields `video` and `video2`
    pub async fn upload(&self, upload: &UploadRequest) -> Result<UploadBody> {
        let url = self.config.endpoint("upload");

        let mut form = Form::new().part("video", file_part(&upload.video).await?);
        if let Some(video2) = &upload.video2 {
            form = form.part("video2", file_part(video2).await?);
        }

        debug!(url = %url, "Sending upload");
        let response = self
            .http
            .post(&url)
            .timeout(self.config.upload_timeout)
            .multipart(form)
            .send()
            .await?;

        decode(response).await
    }

    /// `GET /status/{job_id}`
    pub async fn query_status(&self, job_id: &str) -> Result<StatusBody> {
        let url = self
            .config
            .endpoint(&format!("status/{}", urlencoding::encode(job_id)));

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        decode(response).await
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthResponse> {
        let url = self.config.endpoint("health");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let health: HealthResponse = decode(response).await?;
        if !health.is_healthy() {
            warn!(status = %health.status, "Service reports unhealthy");
        }
        Ok(health)
    }

    /// `GET /download/{filename}`, streamed into `dir`
    ///
    /// The body lands in a `.part` file next to the target and is renamed
    /// into place only once fully received. Returns the path of the written file.
    pub async fn download(&self, filename: &str, dir: &Path) -> Result<PathBuf> {
        let target = target_path(dir, filename)?;
        let url = self
            .config
            .endpoint(&format!("download/{}", urlencoding::encode(filename)));

        let mut response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_from(response).await);
        }

        tokio::fs::create_dir_all(dir).await?;
        let partial = partial_path(&target);
        let written = match stream_to_file(&mut response, &partial).await {
            Ok(written) => written,
            Err(e) => {
                discard(&partial).await;
                return Err(e);
            }
        };
        if let Err(e) = tokio::fs::rename(&partial, &target).await {
            discard(&partial).await;
            return Err(e.into());
        }

        info!(path = %target.display(), bytes = written, "Artifact downloaded");
        Ok(target)
    }
}

#[async_trait]
impl JobService for HttpJobService {
    async fn submit(&self, upload: &UploadRequest) -> mediajob_core::Result<SubmissionReceipt> {
        self.upload(upload)
            .await
            .map(SubmissionReceipt::from)
            .map_err(ClientError::into_submission_error)
    }

    async fn status(&self, job_id: &str) -> mediajob_core::Result<StatusReport> {
        self.query_status(job_id)
            .await
            .map(StatusReport::from)
            .map_err(|e| e.into_status_error(job_id))
    }
}

/// Multipart part streamed from disk
async fn file_part(file: &MediaFile) -> Result<Part> {
    let handle = tokio::fs::File::open(&file.path).await?;
    let len = handle.metadata().await?.len();

    let part = Part::stream_with_length(Body::from(handle), len)
        .file_name(file.file_name.clone());
    match &file.content_type {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|_| ClientError::InvalidConfig(format!("invalid content type {mime:?}"))),
        None => Ok(part),
    }
}

/// Decode a 2xx JSON body, or turn the response into an error
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(error_from(response).await);
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::InvalidResponse {
        status: status.as_u16(),
        message: e.to_string(),
    })
}

/// Non-success response; prefers the server's own `error` text
async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();

    let message = parsed
        .error
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| match status.canonical_reason() {
            Some(reason) => format!("HTTP {} {}", status.as_u16(), reason),
            None => format!("HTTP {}", status.as_u16()),
        });

    ClientError::Http {
        status: status.as_u16(),
        message,
        error_id: parsed.error_id,
    }
}

async fn stream_to_file(response: &mut Response, path: &Path) -> Result<u64> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written: u64 = 0;
    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn discard(partial: &Path) {
    if let Err(e) = tokio::fs::remove_file(partial).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %partial.display(), error = %e, "Failed to remove partial download");
        }
    }
}

/// `dir/.{name}.part` for `dir/{name}`
fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.part"))
}

/// Keep only the final path component of a server-supplied name
fn target_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ClientError::InvalidConfig(format!("invalid file name {filename:?}")))?;
    Ok(dir.join(name))
}
