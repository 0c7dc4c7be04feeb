// Transport retry policy for status queries
use crate::domain::Job;
use tracing::{info, warn};

/// Retry decision result
#[derive(Debug, PartialEq, Eq)]
pub enum RetryDecision {
    /// Query again on the normal cadence
    Retry,
    /// End the tracking session with the transport error
    GiveUp,
}

/// Decides whether a failed status query ends the session
///
/// With `max_retries = 0` (the default) the first transport failure is fatal.
/// Every retry is a real status query and counts toward the job's attempt bound.
#[derive(Debug, Clone, Copy)]
pub struct TransportRetryPolicy {
    max_retries: u32,
}

impl TransportRetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    /// Abort on the first transport failure
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// # Arguments
    /// * `consecutive_failures` - Transport failures in a row, including the current one
    /// * `job` - Job being tracked (its attempt bound still applies)
    pub fn should_retry(&self, consecutive_failures: u32, job: &Job) -> RetryDecision {
        if consecutive_failures > self.max_retries {
            if self.max_retries > 0 {
                warn!(
                    job_id = %job.id,
                    consecutive_failures,
                    max_retries = self.max_retries,
                    "Transport retry budget exhausted"
                );
            }
            return RetryDecision::GiveUp;
        }

        if !job.has_attempts_left() {
            return RetryDecision::GiveUp;
        }

        info!(
            job_id = %job.id,
            attempt = job.attempt,
            consecutive_failures,
            "Retrying status query after transport failure"
        );
        RetryDecision::Retry
    }
}

impl Default for TransportRetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}
