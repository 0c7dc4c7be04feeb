// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod job_service;
pub mod status_display;
pub mod time_provider;

// Re-exports
pub use id_provider::IdProvider;
pub use job_service::{
    JobService, MediaFile, RemoteState, StatusReport, SubmissionReceipt, UploadRequest,
};
pub use status_display::StatusDisplay;
pub use time_provider::TimeProvider;
