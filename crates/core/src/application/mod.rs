// Application Layer - Use Cases and Business Logic

pub mod error_reporter;
pub mod poller;
pub mod retry;
pub mod submit;
pub mod tracker;

// Re-exports
pub use error_reporter::ErrorReporter;
pub use poller::{
    cancel_channel, CancelHandle, CancelToken, JobPoller, TickDecision, TrackingOutcome,
};
pub use retry::{RetryDecision, TransportRetryPolicy};
pub use submit::{Submission, SubmissionFailure, UploadSubmitter};
pub use tracker::{JobTracker, TrackingHandle};
