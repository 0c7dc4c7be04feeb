// Status Display Port (operator-facing UI)

use crate::domain::{CompletedJob, ErrorReport, ProgressView};

/// Whatever renders tracking state for a human (terminal, GUI, web bridge)
///
/// Calls are infallible: the display is the sink of both the progress and
/// the error paths.
pub trait StatusDisplay: Send + Sync {
    /// Render one progress update
    fn show_progress(&self, job_id: Option<&str>, view: &ProgressView);

    /// Render a finished job and its download reference
    fn show_result(&self, result: &CompletedJob);

    /// Render a failure: message prominently, diagnostic as secondary detail
    fn show_error(&self, report: &ErrorReport);

    /// Enable or disable the submission affordance
    fn set_submit_enabled(&self, enabled: bool);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DisplayEvent {
        Progress(ProgressView),
        Result(CompletedJob),
        Error(ErrorReport),
        SubmitEnabled(bool),
    }

    /// Display that records every call in order
    #[derive(Default)]
    pub struct RecordingDisplay {
        events: Mutex<Vec<DisplayEvent>>,
    }

    impl RecordingDisplay {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn events(&self) -> Vec<DisplayEvent> {
            self.events.lock().unwrap().clone()
        }

        pub fn progress_views(&self) -> Vec<ProgressView> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    DisplayEvent::Progress(view) => Some(view),
                    _ => None,
                })
                .collect()
        }

        pub fn results(&self) -> Vec<CompletedJob> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    DisplayEvent::Result(result) => Some(result),
                    _ => None,
                })
                .collect()
        }

        pub fn errors(&self) -> Vec<ErrorReport> {
            self.events()
                .into_iter()
                .filter_map(|e| match e {
                    DisplayEvent::Error(report) => Some(report),
                    _ => None,
                })
                .collect()
        }

        /// Last value passed to `set_submit_enabled`
        pub fn submit_enabled(&self) -> Option<bool> {
            self.events().into_iter().rev().find_map(|e| match e {
                DisplayEvent::SubmitEnabled(enabled) => Some(enabled),
                _ => None,
            })
        }

        fn push(&self, event: DisplayEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    impl StatusDisplay for RecordingDisplay {
        fn show_progress(&self, _job_id: Option<&str>, view: &ProgressView) {
            self.push(DisplayEvent::Progress(view.clone()));
        }

        fn show_result(&self, result: &CompletedJob) {
            self.push(DisplayEvent::Result(result.clone()));
        }

        fn show_error(&self, report: &ErrorReport) {
            self.push(DisplayEvent::Error(report.clone()));
        }

        fn set_submit_enabled(&self, enabled: bool) {
            self.push(DisplayEvent::SubmitEnabled(enabled));
        }
    }
}
