//! Terminal rendering of tracking progress

use colored::Colorize;
use mediajob_core::domain::{CompletedJob, ErrorReport, ProgressView};
use mediajob_core::port::StatusDisplay;
use std::sync::Mutex;
use tracing::debug;

const BAR_WIDTH: usize = 30;

/// Prints one line per progress update
pub struct TerminalDisplay {
    /// Print the diagnostic payload under each error
    show_details: bool,
    last: Mutex<Option<ProgressView>>,
}

impl TerminalDisplay {
    pub fn new(show_details: bool) -> Self {
        Self {
            show_details,
            last: Mutex::new(None),
        }
    }
}

impl StatusDisplay for TerminalDisplay {
    fn show_progress(&self, job_id: Option<&str>, view: &ProgressView) {
        // Identical consecutive updates are common while a job is queued
        if let Ok(mut last) = self.last.lock() {
            if last.as_ref() == Some(view) {
                return;
            }
            *last = Some(view.clone());
        }

        let label = job_id.map(short_id).unwrap_or_default();
        println!(
            "  {} {} {:>3}%  {}",
            label.dimmed(),
            progress_bar(view.percent, BAR_WIDTH).cyan(),
            view.percent,
            view.text
        );
    }

    fn show_result(&self, job: &CompletedJob) {
        println!();
        println!("{}", "✓ Video processed successfully".green().bold());
        println!("  {} {}", "File:".bold(), job.filename);
        println!("  {} {}", "Download:".bold(), job.download_url);
    }

    fn show_error(&self, report: &ErrorReport) {
        eprintln!();
        eprintln!("{} {}", "✗".red().bold(), report.message.red().bold());
        eprintln!("  {} {}", "Error ID:".bold(), report.diagnostic.error_id);
        if let Some(server_id) = &report.diagnostic.server_error_id {
            eprintln!("  {} {}", "Server error ID:".bold(), server_id);
        }
        if self.show_details {
            eprintln!("  {}", "Details:".bold());
            for line in report.details_json().lines() {
                eprintln!("    {}", line.dimmed());
            }
        }
    }

    fn set_submit_enabled(&self, enabled: bool) {
        debug!(enabled, "Submit control");
    }
}

/// `[######------]` with `width` cells
pub fn progress_bar(percent: u8, width: usize) -> String {
    let filled = (usize::from(percent.min(100)) * width + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

/// Celery ids are long UUIDs; the first block is enough on screen
fn short_id(id: &str) -> String {
    id.split('-').next().unwrap_or(id).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(0, 10), "[----------]");
        assert_eq!(progress_bar(45, 10), "[#####-----]");
        assert_eq!(progress_bar(100, 10), "[##########]");
        assert_eq!(progress_bar(250, 4), "[####]");
    }

    #[test]
    fn test_short_id() {
        assert_eq!(short_id("3f1c9a2e-77aa-4c1e-9d2b-1b2c3d4e5f60"), "3f1c9a2e");
        assert_eq!(short_id("plain"), "plain");
    }
}
