//! MediaJob Client - HTTP adapter for the video processing service
//!
//! Implements the core `JobService` port over `POST /upload` and
//! `GET /status/{job_id}`, plus the service's health and download endpoints.
//!
//! # Example
//!
//! ```no_run
//! use mediajob_client::{ClientConfig, HttpJobService};
//! use mediajob_core::port::{JobService, MediaFile, UploadRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = HttpJobService::new(ClientConfig::from_env()?)?;
//!
//!     let upload = UploadRequest::new(MediaFile::from_path("clip.mp4"));
//!     let receipt = service.submit(&upload).await?;
//!     println!("Job queued: {:?}", receipt.job_id);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::HttpJobService;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use types::{AssetStatus, HealthResponse, StatusBody, UploadBody};
