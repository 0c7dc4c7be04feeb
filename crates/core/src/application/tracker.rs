// Job Tracker - one submission-and-tracking session per call

use crate::application::error_reporter::ErrorReporter;
use crate::application::poller::{
    cancel_channel, CancelHandle, CancelToken, JobPoller, TrackingOutcome,
};
use crate::application::submit::{Submission, SubmissionFailure, UploadSubmitter};
use crate::config::TrackerConfig;
use crate::domain::{CompletedJob, EnvironmentInfo, Job, JobId, JobState, ProgressReporter};
use crate::port::{IdProvider, JobService, StatusDisplay, TimeProvider, UploadRequest};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Wires submitter, poller and reporter around injected ports
pub struct JobTracker {
    service: Arc<dyn JobService>,
    display: Arc<dyn StatusDisplay>,
    time_provider: Arc<dyn TimeProvider>,
    reporter: Arc<ErrorReporter>,
    submitter: UploadSubmitter,
    config: TrackerConfig,
}

impl JobTracker {
    pub fn new(
        service: Arc<dyn JobService>,
        display: Arc<dyn StatusDisplay>,
        time_provider: Arc<dyn TimeProvider>,
        id_provider: Arc<dyn IdProvider>,
        config: TrackerConfig,
    ) -> Self {
        let reporter = Arc::new(ErrorReporter::new(
            Arc::clone(&display),
            Arc::clone(&time_provider),
            id_provider,
            EnvironmentInfo::current(config.base_url.clone()),
        ));
        let submitter = UploadSubmitter::new(
            Arc::clone(&service),
            Arc::clone(&display),
            Arc::clone(&reporter),
            Arc::clone(&time_provider),
            config.base_url.clone(),
            config.max_attempts,
        );

        Self {
            service,
            display,
            time_provider,
            reporter,
            submitter,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Arc<ErrorReporter> {
        &self.reporter
    }

    /// Submit without tracking
    pub async fn submit(
        &self,
        upload: &UploadRequest,
    ) -> std::result::Result<Submission, SubmissionFailure> {
        self.submitter.submit(upload).await
    }

    /// Submit, then track inline until the session ends
    pub async fn submit_and_track(&self, upload: &UploadRequest) -> TrackingOutcome {
        match self.submit(upload).await {
            Ok(submission) => self.track(submission).await,
            Err(failure) => TrackingOutcome::Failed(failure.report),
        }
    }

    /// Track on the current task. Not cancellable.
    pub async fn track(&self, submission: Submission) -> TrackingOutcome {
        match submission {
            Submission::Queued(job) => {
                let (_handle, token) = cancel_channel();
                self.poller(job, token).run().await
            }
            Submission::Completed(completed) => self.finish_direct(completed),
        }
    }

    /// Track on a spawned task; the handle can cancel or await it
    pub fn start(&self, submission: Submission) -> TrackingHandle {
        let (cancel, token) = cancel_channel();

        let (job_id, task) = match submission {
            Submission::Queued(job) => {
                let job_id = Some(job.id.clone());
                let poller = self.poller(job, token);
                (job_id, tokio::spawn(poller.run()))
            }
            Submission::Completed(completed) => {
                let outcome = self.finish_direct(completed);
                (None, tokio::spawn(async move { outcome }))
            }
        };

        TrackingHandle {
            job_id,
            cancel,
            session: Session::Running(task),
            reporter: Arc::clone(&self.reporter),
        }
    }

    fn poller(&self, job: Job, token: CancelToken) -> JobPoller {
        JobPoller::new(
            job,
            Arc::clone(&self.service),
            Arc::clone(&self.display),
            Arc::clone(&self.reporter),
            Arc::clone(&self.time_provider),
            &self.config,
            token,
        )
    }

    /// Synchronous server-side completion: no polling, same terminal display
    fn finish_direct(&self, completed: CompletedJob) -> TrackingOutcome {
        info!(
            filename = %completed.filename,
            download_url = %completed.download_url,
            "Upload completed without queueing"
        );
        let view = ProgressReporter::render(JobState::Success, None, None);
        self.display.show_progress(None, &view);
        self.display.show_result(&completed);
        self.display.set_submit_enabled(true);
        TrackingOutcome::Completed(completed)
    }
}

enum Session {
    Running(JoinHandle<TrackingOutcome>),
    Ended(TrackingOutcome),
}

/// Handle to a spawned tracking session
pub struct TrackingHandle {
    job_id: Option<JobId>,
    cancel: CancelHandle,
    session: Session,
    reporter: Arc<ErrorReporter>,
}

impl TrackingHandle {
    /// `None` for direct-mode submissions
    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_deref()
    }

    /// Stop polling before the next status query
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        match &self.session {
            Session::Running(task) => task.is_finished(),
            Session::Ended(_) => true,
        }
    }

    /// Wait for the session to end
    ///
    /// Cancel-safe; once the session ended every call returns the same outcome.
    pub async fn wait(&mut self) -> TrackingOutcome {
        let joined = match &mut self.session {
            Session::Ended(outcome) => return outcome.clone(),
            Session::Running(task) => task.await,
        };

        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(job_id = ?self.job_id, error = %e, "Tracking task aborted");
                TrackingOutcome::Failed(self.reporter.report(
                    "Tracking stopped unexpectedly",
                    None,
                    None,
                ))
            }
        };
        self.session = Session::Ended(outcome.clone());
        outcome
    }
}
