// Domain Layer - Pure business logic and entities

pub mod diagnostic;
pub mod error;
pub mod job;
pub mod progress;

// Re-exports
pub use diagnostic::{Diagnostic, EnvironmentInfo, ErrorReport};
pub use error::DomainError;
pub use job::{download_reference, CompletedJob, Job, JobId, JobState};
pub use progress::{ProgressReporter, ProgressView};
