//! Tracing setup
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (default: `mediajob=info`)
//! - `MEDIAJOB_LOG_FORMAT`: `pretty` (default) or `json`
//! - `MEDIAJOB_LOG_DIR`: also write a daily rolling log file here

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_FILTER: &str = "mediajob=info";
const LOG_FILE_PREFIX: &str = "mediajob.log";

/// Install the global subscriber. Console output goes to stderr so stdout
/// only carries progress and results.
///
/// The returned guard must live until exit, or buffered file lines are lost.
pub fn init(verbose: bool) -> Result<Option<WorkerGuard>> {
    let default_filter = if verbose { "mediajob=debug" } else { DEFAULT_FILTER };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("Invalid log filter")?;

    let log_format =
        std::env::var("MEDIAJOB_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let console = match log_format.as_str() {
        // Production: JSON structured logging
        "json" => fmt::layer().json().with_writer(std::io::stderr).boxed(),
        _ => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    let (file, guard) = match std::env::var("MEDIAJOB_LOG_DIR") {
        Ok(dir) => {
            let dir = shellexpand::tilde(&dir).into_owned();
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(file)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}
