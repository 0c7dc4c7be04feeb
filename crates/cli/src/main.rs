//! MediaJob CLI - submit videos and track processing jobs

mod display;
mod logging;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use display::TerminalDisplay;
use mediajob_client::{ClientConfig, HealthResponse, HttpJobService};
use mediajob_core::application::{JobTracker, TrackingOutcome};
use mediajob_core::domain::{JobState, ProgressReporter};
use mediajob_core::port::id_provider::UuidProvider;
use mediajob_core::port::time_provider::SystemTimeProvider;
use mediajob_core::port::{JobService, MediaFile, RemoteState, UploadRequest};
use mediajob_core::TrackerConfig;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "mediajob")]
#[command(about = "Submit videos for processing and track the jobs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Processing service URL
    #[arg(long, env = "MEDIAJOB_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Debug logging and full error details
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a video and track the job until it finishes
    Submit {
        /// Primary video file
        video: String,

        /// Optional second video, merged before processing
        #[arg(long)]
        video2: Option<String>,

        /// Download the result into this directory
        #[arg(short, long)]
        download_dir: Option<String>,
    },

    /// Query a job once
    Status {
        /// Job ID
        job_id: String,
    },

    /// Show service health
    Health,

    /// Download a processed video
    Download {
        /// Output file name reported by the service
        filename: String,

        /// Target directory
        #[arg(short, long, default_value = ".")]
        output_dir: String,
    },
}

#[derive(Tabled)]
struct HealthRow {
    component: String,
    status: String,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose)?;

    let mut tracker_config =
        TrackerConfig::from_env().context("Invalid tracker configuration")?;
    let mut client_config = ClientConfig::from_env().context("Invalid client configuration")?;
    if let Some(url) = &cli.base_url {
        tracker_config = tracker_config.with_base_url(url.clone());
        client_config = client_config.with_base_url(url.clone());
        tracker_config.validate().context("Invalid --base-url")?;
    }

    let client =
        Arc::new(HttpJobService::new(client_config).context("Failed to create HTTP client")?);

    match cli.command {
        Commands::Submit {
            video,
            video2,
            download_dir,
        } => {
            let mut upload = UploadRequest::new(MediaFile::from_path(expand(&video)));
            if let Some(video2) = video2 {
                upload = upload.with_secondary(MediaFile::from_path(expand(&video2)));
            }

            let outcome = submit(client.clone(), tracker_config, cli.verbose, &upload).await;
            match outcome {
                TrackingOutcome::Completed(done) => {
                    if let Some(dir) = download_dir {
                        let path = client
                            .download(&done.filename, &expand(&dir))
                            .await
                            .context("Download failed")?;
                        println!("  {} {}", "Saved:".bold(), path.display());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                TrackingOutcome::Failed(_) => Ok(ExitCode::FAILURE),
                TrackingOutcome::Cancelled => {
                    println!("{}", "Tracking cancelled".yellow());
                    Ok(ExitCode::from(130))
                }
            }
        }

        Commands::Status { job_id } => status(&client, &job_id).await,

        Commands::Health => {
            let health = client.health().await.context("Health check failed")?;
            print_health(client.config().root(), &health);
            Ok(if health.is_healthy() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Commands::Download {
            filename,
            output_dir,
        } => {
            let path = client
                .download(&filename, &expand(&output_dir))
                .await
                .context("Download failed")?;
            println!("{} {}", "✓ Saved".green().bold(), path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Submit and track; Ctrl+C stops tracking (the server-side job keeps running)
async fn submit(
    client: Arc<HttpJobService>,
    config: TrackerConfig,
    verbose: bool,
    upload: &UploadRequest,
) -> TrackingOutcome {
    let tracker = JobTracker::new(
        client,
        Arc::new(TerminalDisplay::new(verbose)),
        Arc::new(SystemTimeProvider),
        Arc::new(UuidProvider),
        config,
    );

    println!("{} {}", "Uploading".cyan().bold(), upload.video.path.display());
    let submission = match tracker.submit(upload).await {
        Ok(submission) => submission,
        Err(failure) => return TrackingOutcome::Failed(failure.report),
    };

    let mut handle = tracker.start(submission);
    if let Some(job_id) = handle.job_id() {
        println!("{} {}", "Job".cyan().bold(), job_id);
    }

    tokio::select! {
        outcome = handle.wait() => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!(job_id = ?handle.job_id(), "Interrupted, stopping tracking");
            handle.cancel();
            handle.wait().await
        }
    }
}

async fn status(client: &HttpJobService, job_id: &str) -> Result<ExitCode> {
    let report = client
        .status(job_id)
        .await
        .with_context(|| format!("Status query for job {} failed", job_id))?;

    let state = match report.remote_state() {
        RemoteState::Pending => JobState::Pending,
        RemoteState::Processing => JobState::Processing,
        RemoteState::Success => JobState::Success,
        RemoteState::Failure | RemoteState::Unrecognized => JobState::Failure,
    };
    let text = report.status.as_deref().or(report.error.as_deref());
    let view = ProgressReporter::render(state, report.progress, text);
    info!(job_id, state = %report.state, "Status received");

    println!("{} {}", "Job:".bold(), job_id);
    println!("{} {}", "State:".bold(), report.state);
    println!(
        "{} {} {:>3}%  {}",
        "Progress:".bold(),
        display::progress_bar(view.percent, 30).cyan(),
        view.percent,
        view.text
    );
    if let Some(name) = report.output_filename() {
        println!("{} {}", "Output:".bold(), name);
    }

    Ok(match state {
        JobState::Failure => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}

fn print_health(base_url: &str, health: &HealthResponse) {
    let status = if health.is_healthy() {
        health.status.green().to_string()
    } else {
        health.status.red().to_string()
    };
    println!("{} {}", "Service:".bold(), base_url);
    println!("{} {}", "Status:".bold(), status);
    println!();

    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let mut rows = vec![
        HealthRow {
            component: "redis".to_string(),
            status: or_dash(&health.redis),
        },
        HealthRow {
            component: "celery".to_string(),
            status: or_dash(&health.celery),
        },
    ];
    if let Some(assets) = &health.assets {
        rows.push(HealthRow {
            component: "watermark".to_string(),
            status: present(assets.watermark),
        });
        rows.push(HealthRow {
            component: "outro".to_string(),
            status: present(assets.outro),
        });
    }
    println!("{}", Table::new(rows));

    if !health.queue_connected() {
        println!();
        println!(
            "{}",
            "Queue unavailable: uploads will be processed synchronously".yellow()
        );
    }
}

fn present(found: bool) -> String {
    if found { "present" } else { "missing" }.to_string()
}

fn expand(path: &str) -> PathBuf {
    Path::new(shellexpand::tilde(path).as_ref()).to_path_buf()
}
