// Job Poller - bounded status polling for one submitted job

mod cancel;
pub mod constants;

pub use cancel::{cancel_channel, CancelHandle, CancelToken};

use crate::application::error_reporter::ErrorReporter;
use crate::application::retry::{RetryDecision, TransportRetryPolicy};
use crate::config::TrackerConfig;
use crate::domain::{download_reference, CompletedJob, ErrorReport, Job, ProgressReporter};
use crate::error::{AppError, GENERIC_JOB_FAILURE};
use crate::port::{JobService, RemoteState, StatusDisplay, StatusReport, TimeProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// How a tracking session ended
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingOutcome {
    /// Artifact produced; download reference ready
    Completed(CompletedJob),
    /// Session ended in failure (already reported)
    Failed(ErrorReport),
    /// Stopped on request before reaching a terminal state
    Cancelled,
}

impl TrackingOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TrackingOutcome::Completed(_))
    }
}

/// Result of a single tick
#[derive(Debug)]
pub enum TickDecision {
    /// Schedule the next status query after the poll interval
    Continue,
    /// Terminal: no further status queries
    Finished(TrackingOutcome),
}

/// Poll task owning the Job record of one tracking session
///
/// Status queries are strictly sequential: the next one is scheduled only
/// after the previous one resolved.
pub struct JobPoller {
    job: Job,
    service: Arc<dyn JobService>,
    display: Arc<dyn StatusDisplay>,
    reporter: Arc<ErrorReporter>,
    time_provider: Arc<dyn TimeProvider>,
    retry_policy: TransportRetryPolicy,
    base_url: String,
    poll_interval: Duration,
    consecutive_failures: u32,
    cancel: CancelToken,
}

impl JobPoller {
    pub fn new(
        job: Job,
        service: Arc<dyn JobService>,
        display: Arc<dyn StatusDisplay>,
        reporter: Arc<ErrorReporter>,
        time_provider: Arc<dyn TimeProvider>,
        config: &TrackerConfig,
        cancel: CancelToken,
    ) -> Self {
        Self {
            job,
            service,
            display,
            reporter,
            time_provider,
            retry_policy: TransportRetryPolicy::new(config.transport_retries),
            base_url: config.base_url.clone(),
            poll_interval: config.poll_interval,
            consecutive_failures: 0,
            cancel,
        }
    }

    /// Current Job record
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Run ticks until a terminal state, the attempt bound, or cancellation
    pub async fn run(mut self) -> TrackingOutcome {
        info!(
            job_id = %self.job.id,
            max_attempts = self.job.max_attempts,
            interval_ms = self.poll_interval.as_millis() as u64,
            "Tracking job"
        );

        loop {
            if self.cancel.is_cancelled() {
                return self.cancelled();
            }

            if let TickDecision::Finished(outcome) = self.tick().await {
                return outcome;
            }

            let mut cancel = self.cancel.clone();
            tokio::select! {
                _ = sleep(self.poll_interval) => {},
                _ = cancel.cancelled() => return self.cancelled(),
            }
        }
    }

    /// One status query plus the resulting state update and scheduling decision
    pub async fn tick(&mut self) -> TickDecision {
        let attempt = match self.job.record_attempt() {
            Ok(n) => n,
            Err(e) => return self.fail(AppError::Domain(e)),
        };
        debug!(job_id = %self.job.id, attempt, "Querying job status");

        let report = match self.service.status(&self.job.id).await {
            Ok(report) => {
                self.consecutive_failures = 0;
                report
            }
            Err(e) => return self.on_transport_failure(e),
        };

        let applied = match report.remote_state() {
            RemoteState::Pending => self.job.mark_pending(),
            RemoteState::Processing => self.job.mark_processing(
                ProgressReporter::normalize(report.progress),
                report.status.clone(),
            ),
            RemoteState::Success => return self.on_success(&report),
            RemoteState::Failure | RemoteState::Unrecognized => return self.on_failure(&report),
        };
        if let Err(e) = applied {
            return self.fail(AppError::Domain(e));
        }

        self.display
            .show_progress(Some(&self.job.id), &ProgressReporter::for_job(&self.job));

        self.continue_or_time_out()
    }

    fn continue_or_time_out(&mut self) -> TickDecision {
        if self.job.has_attempts_left() {
            return TickDecision::Continue;
        }

        warn!(
            job_id = %self.job.id,
            attempts = self.job.attempt,
            "Attempt bound reached without a terminal state"
        );
        let now = self.time_provider.now_millis();
        if let Err(e) = self.job.time_out(now) {
            return self.fail(AppError::Domain(e));
        }
        let err = AppError::TrackingTimeout {
            job_id: self.job.id.clone(),
            attempts: self.job.attempt,
        };
        TickDecision::Finished(self.report(&err))
    }

    fn on_transport_failure(&mut self, err: AppError) -> TickDecision {
        self.consecutive_failures += 1;
        warn!(
            job_id = %self.job.id,
            attempt = self.job.attempt,
            error = %err,
            "Status query failed"
        );

        match self
            .retry_policy
            .should_retry(self.consecutive_failures, &self.job)
        {
            RetryDecision::Retry => TickDecision::Continue,
            RetryDecision::GiveUp => self.fail(err),
        }
    }

    fn on_success(&mut self, report: &StatusReport) -> TickDecision {
        let filename = self
            .job
            .output_filename
            .clone()
            .or_else(|| report.output_filename());

        let Some(filename) = filename else {
            return self.fail(AppError::JobReportedFailure {
                job_id: self.job.id.clone(),
                message: "Processing finished but no output file was reported".to_string(),
                server_error_id: report.error_id.clone(),
            });
        };

        let now = self.time_provider.now_millis();
        if let Err(e) = self.job.complete(now) {
            return self.fail(AppError::Domain(e));
        }
        self.job.output_filename = Some(filename.clone());
        self.display
            .show_progress(Some(&self.job.id), &ProgressReporter::for_job(&self.job));

        let completed = CompletedJob {
            job_id: Some(self.job.id.clone()),
            download_url: download_reference(&self.base_url, &filename),
            filename,
        };
        info!(
            job_id = %self.job.id,
            attempts = self.job.attempt,
            download_url = %completed.download_url,
            "Job completed"
        );

        self.display.show_result(&completed);
        self.display.set_submit_enabled(true);
        TickDecision::Finished(TrackingOutcome::Completed(completed))
    }

    fn on_failure(&mut self, report: &StatusReport) -> TickDecision {
        if report.remote_state() == RemoteState::Unrecognized {
            warn!(
                job_id = %self.job.id,
                state = %report.state,
                "Unrecognized job state, treating as failure"
            );
        }

        let message = [report.status.as_deref(), report.error.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|m| !m.is_empty())
            .unwrap_or(GENERIC_JOB_FAILURE)
            .to_string();

        self.fail(AppError::JobReportedFailure {
            job_id: self.job.id.clone(),
            message,
            server_error_id: report.error_id.clone(),
        })
    }

    /// End the session in failure and report it
    fn fail(&mut self, err: AppError) -> TickDecision {
        if !self.job.is_terminal() {
            let now = self.time_provider.now_millis();
            let message = match &err {
                AppError::JobReportedFailure { message, .. } => Some(message.clone()),
                _ => None,
            };
            // Only fails when already terminal, which was just ruled out
            let _ = self.job.fail(now, message);
        }
        TickDecision::Finished(self.report(&err))
    }

    fn report(&self, err: &AppError) -> TrackingOutcome {
        let origin_url = format!(
            "{}/status/{}",
            self.base_url.trim_end_matches('/'),
            self.job.id
        );
        TrackingOutcome::Failed(self.reporter.report_error(err, Some(&origin_url)))
    }

    fn cancelled(&self) -> TrackingOutcome {
        info!(
            job_id = %self.job.id,
            attempts = self.job.attempt,
            "Tracking cancelled"
        );
        self.display.set_submit_enabled(true);
        TrackingOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EnvironmentInfo, JobState, ProgressView};
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_service::mocks::ScriptedJobService;
    use crate::port::status_display::mocks::RecordingDisplay;
    use crate::port::time_provider::mocks::FixedTimeProvider;

    const BASE_URL: &str = "http://localhost:5000";

    struct Harness {
        service: Arc<ScriptedJobService>,
        display: Arc<RecordingDisplay>,
        poller: JobPoller,
        _cancel: CancelHandle,
    }

    fn harness(service: ScriptedJobService, config: TrackerConfig) -> Harness {
        let service = Arc::new(service);
        let display = Arc::new(RecordingDisplay::new());
        let time_provider = Arc::new(FixedTimeProvider::new(1_000));
        let reporter = Arc::new(ErrorReporter::new(
            display.clone(),
            time_provider.clone(),
            Arc::new(SequentialIdProvider::new("err")),
            EnvironmentInfo::current(BASE_URL),
        ));
        let job = Job::new(
            "job-1",
            Some("output_1.mp4".to_string()),
            config.max_attempts,
            1_000,
        );
        let (cancel_handle, cancel_token) = cancel_channel();
        let poller = JobPoller::new(
            job,
            service.clone(),
            display.clone(),
            reporter,
            time_provider,
            &config,
            cancel_token,
        );
        Harness {
            service,
            display,
            poller,
            _cancel: cancel_handle,
        }
    }

    fn fast_config() -> TrackerConfig {
        TrackerConfig {
            base_url: BASE_URL.to_string(),
            poll_interval: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_display_sequence_to_success() {
        let h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::pending())
                .with_status(StatusReport::processing(45.0, "encoding"))
                .with_status(StatusReport::success()),
            fast_config(),
        );

        let outcome = h.poller.run().await;

        let views = h.display.progress_views();
        assert_eq!(
            views,
            vec![
                ProgressView { percent: 5, text: "waiting".to_string() },
                ProgressView { percent: 45, text: "encoding".to_string() },
                ProgressView { percent: 100, text: "completed".to_string() },
            ]
        );

        let TrackingOutcome::Completed(done) = outcome else {
            panic!("expected completion, got {:?}", outcome);
        };
        assert_eq!(done.download_url, "http://localhost:5000/download/output_1.mp4");
        assert_eq!(h.display.results(), vec![done]);
        assert_eq!(h.service.status_calls(), 3);
        assert_eq!(h.display.submit_enabled(), Some(true));
    }

    #[tokio::test]
    async fn test_failure_stops_after_one_query() {
        let h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::failure("codec error"))
                .then_forever(StatusReport::pending()),
            fast_config(),
        );

        let outcome = h.poller.run().await;

        assert_eq!(h.service.status_calls(), 1);
        let TrackingOutcome::Failed(report) = outcome else {
            panic!("expected failure");
        };
        assert!(report.message.contains("codec error"));
        assert_eq!(report.diagnostic.kind.as_deref(), Some("JobReportedFailure"));
        assert_eq!(
            report.diagnostic.origin_url.as_deref(),
            Some("http://localhost:5000/status/job-1")
        );
        assert!(h.display.results().is_empty());
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_error_field_then_generic() {
        let mut with_error = StatusReport::new("FAILURE");
        with_error.error = Some("ffmpeg exited with 1".to_string());
        let h = harness(ScriptedJobService::new().with_status(with_error), fast_config());
        let TrackingOutcome::Failed(report) = h.poller.run().await else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "ffmpeg exited with 1");

        let h = harness(
            ScriptedJobService::new().with_status(StatusReport::new("FAILURE")),
            fast_config(),
        );
        let TrackingOutcome::Failed(report) = h.poller.run().await else {
            panic!("expected failure");
        };
        assert_eq!(report.message, GENERIC_JOB_FAILURE);
    }

    #[tokio::test]
    async fn test_unrecognized_state_is_failure() {
        let h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::new("REVOKED").with_status("task revoked")),
            fast_config(),
        );

        let TrackingOutcome::Failed(report) = h.poller.run().await else {
            panic!("expected failure");
        };
        assert_eq!(report.message, "task revoked");
        assert_eq!(h.service.status_calls(), 1);
    }

    #[tokio::test]
    async fn test_frozen_progress_times_out_at_bound() {
        let h = harness(
            ScriptedJobService::new().then_forever(StatusReport::processing(10.0, "encoding")),
            fast_config(),
        );

        let outcome = h.poller.run().await;

        assert_eq!(h.service.status_calls(), 300);
        let TrackingOutcome::Failed(report) = outcome else {
            panic!("expected timeout");
        };
        assert_eq!(report.diagnostic.kind.as_deref(), Some("TrackingTimeout"));
        assert!(report.message.contains("timed out"));
        assert_eq!(h.display.progress_views().len(), 300);
    }

    #[tokio::test]
    async fn test_transport_failure_is_fatal_by_default() {
        let h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::pending())
                .with_transport_failure("connection reset")
                .then_forever(StatusReport::success()),
            fast_config(),
        );

        let TrackingOutcome::Failed(report) = h.poller.run().await else {
            panic!("expected failure");
        };
        assert_eq!(h.service.status_calls(), 2);
        assert_eq!(report.diagnostic.kind.as_deref(), Some("PollTransportError"));
        assert!(report
            .diagnostic
            .error
            .as_deref()
            .unwrap()
            .contains("connection reset"));
    }

    #[tokio::test]
    async fn test_transport_retry_when_configured() {
        let config = TrackerConfig {
            transport_retries: 2,
            ..fast_config()
        };
        let h = harness(
            ScriptedJobService::new()
                .with_transport_failure("timeout")
                .with_transport_failure("timeout")
                .with_status(StatusReport::success()),
            config,
        );

        let outcome = h.poller.run().await;
        assert!(outcome.is_completed());
        assert_eq!(h.service.status_calls(), 3);
    }

    #[tokio::test]
    async fn test_transport_retry_budget_resets_after_success() {
        let config = TrackerConfig {
            transport_retries: 1,
            ..fast_config()
        };
        let h = harness(
            ScriptedJobService::new()
                .with_transport_failure("blip")
                .with_status(StatusReport::pending())
                .with_transport_failure("blip")
                .with_status(StatusReport::success()),
            config,
        );

        assert!(h.poller.run().await.is_completed());
        assert_eq!(h.service.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_success_without_filename_uses_output_path() {
        let service = Arc::new(
            ScriptedJobService::new().with_status({
                let mut report = StatusReport::success();
                report.output_path = Some("/app/outputs/output_abc.mp4".to_string());
                report
            }),
        );
        let display = Arc::new(RecordingDisplay::new());
        let time_provider = Arc::new(FixedTimeProvider::new(0));
        let reporter = Arc::new(ErrorReporter::new(
            display.clone(),
            time_provider.clone(),
            Arc::new(SequentialIdProvider::new("err")),
            EnvironmentInfo::current(BASE_URL),
        ));
        let (_handle, token) = cancel_channel();
        let poller = JobPoller::new(
            Job::new("job-2", None, 300, 0),
            service,
            display,
            reporter,
            time_provider,
            &fast_config(),
            token,
        );

        let TrackingOutcome::Completed(done) = poller.run().await else {
            panic!("expected completion");
        };
        assert_eq!(done.filename, "output_abc.mp4");
    }

    #[tokio::test]
    async fn test_success_without_any_filename_fails() {
        let service = Arc::new(ScriptedJobService::new().with_status(StatusReport::success()));
        let display = Arc::new(RecordingDisplay::new());
        let time_provider = Arc::new(FixedTimeProvider::new(0));
        let reporter = Arc::new(ErrorReporter::new(
            display.clone(),
            time_provider.clone(),
            Arc::new(SequentialIdProvider::new("err")),
            EnvironmentInfo::current(BASE_URL),
        ));
        let (_handle, token) = cancel_channel();
        let poller = JobPoller::new(
            Job::new("job-3", None, 300, 0),
            service,
            display.clone(),
            reporter,
            time_provider,
            &fast_config(),
            token,
        );

        let outcome = poller.run().await;
        assert!(matches!(outcome, TrackingOutcome::Failed(_)));
        assert!(display.results().is_empty());
    }

    #[tokio::test]
    async fn test_tick_updates_job_record() {
        let mut h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::processing(62.4, "merging videos")),
            fast_config(),
        );

        let decision = h.poller.tick().await;
        assert!(matches!(decision, TickDecision::Continue));

        let job = h.poller.job();
        assert_eq!(job.attempt, 1);
        assert_eq!(job.state, JobState::Processing);
        assert_eq!(job.progress, 62);
        assert_eq!(job.status_message.as_deref(), Some("merging videos"));
    }

    #[tokio::test]
    async fn test_queries_never_overlap() {
        let h = harness(
            ScriptedJobService::new()
                .with_status(StatusReport::pending())
                .with_status(StatusReport::processing(20.0, "encoding"))
                .with_status(StatusReport::processing(80.0, "encoding"))
                .with_status(StatusReport::success()),
            fast_config(),
        );

        let service = h.service.clone();
        h.poller.run().await;
        assert_eq!(service.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_follow_fixed_interval() {
        let config = TrackerConfig {
            base_url: BASE_URL.to_string(),
            max_attempts: 5,
            ..Default::default()
        };
        let h = harness(
            ScriptedJobService::new().then_forever(StatusReport::pending()),
            config,
        );

        let started = tokio::time::Instant::now();
        let outcome = h.poller.run().await;

        // First query is immediate, then one interval between each of the remaining four
        assert_eq!(started.elapsed(), constants::POLL_INTERVAL * 4);
        assert_eq!(h.service.status_calls(), 5);
        assert!(matches!(outcome, TrackingOutcome::Failed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let service = Arc::new(ScriptedJobService::new().then_forever(StatusReport::pending()));
        let display = Arc::new(RecordingDisplay::new());
        let time_provider = Arc::new(FixedTimeProvider::new(0));
        let reporter = Arc::new(ErrorReporter::new(
            display.clone(),
            time_provider.clone(),
            Arc::new(SequentialIdProvider::new("err")),
            EnvironmentInfo::current(BASE_URL),
        ));
        let (handle, token) = cancel_channel();
        let poller = JobPoller::new(
            Job::new("job-4", None, 300, 0),
            service.clone(),
            display.clone(),
            reporter,
            time_provider,
            &TrackerConfig::default(),
            token,
        );

        let task = tokio::spawn(poller.run());
        tokio::time::sleep(Duration::from_millis(4_500)).await;
        handle.cancel();

        let outcome = task.await.unwrap();
        assert_eq!(outcome, TrackingOutcome::Cancelled);
        // Queries at t=0, 2s, 4s
        assert_eq!(service.status_calls(), 3);
        assert!(display.errors().is_empty());
        assert_eq!(display.submit_enabled(), Some(true));
    }
}
