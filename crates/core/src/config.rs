// Tracker configuration (injected; the core never derives the base URL)

use crate::application::poller::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_TRANSPORT_RETRIES, POLL_INTERVAL,
};
use crate::error::{AppError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Service root, used to build download references
    pub base_url: String,
    /// Fixed delay between status queries
    pub poll_interval: Duration,
    /// Ceiling on status queries per job
    pub max_attempts: u32,
    /// Consecutive transport failures tolerated before giving up (0 = abort on first)
    pub transport_retries: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            transport_retries: DEFAULT_TRANSPORT_RETRIES,
        }
    }
}

impl TrackerConfig {
    /// Load from environment variables, falling back to defaults
    ///
    /// - `MEDIAJOB_BASE_URL`
    /// - `MEDIAJOB_POLL_INTERVAL_MS`
    /// - `MEDIAJOB_MAX_ATTEMPTS`
    /// - `MEDIAJOB_TRANSPORT_RETRIES`
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let base_url = std::env::var("MEDIAJOB_BASE_URL").unwrap_or(defaults.base_url);
        let poll_interval = match parse_env::<u64>("MEDIAJOB_POLL_INTERVAL_MS")? {
            Some(ms) => Duration::from_millis(ms),
            None => defaults.poll_interval,
        };
        let max_attempts =
            parse_env::<u32>("MEDIAJOB_MAX_ATTEMPTS")?.unwrap_or(defaults.max_attempts);
        let transport_retries =
            parse_env::<u32>("MEDIAJOB_TRANSPORT_RETRIES")?.unwrap_or(defaults.transport_retries);

        let config = Self {
            base_url,
            poll_interval,
            max_attempts,
            transport_retries,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(AppError::Config(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(AppError::Config(
                "poll_interval must be greater than zero".to_string(),
            ));
        }
        if self.base_url.trim().is_empty() {
            return Err(AppError::Config("base_url must not be empty".to_string()));
        }
        Ok(())
    }

    /// Longest time a job may be tracked before giving up
    pub fn tracking_budget(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| AppError::Config(format!("{} has an invalid value: {:?}", key, raw))),
        Err(_) => Ok(None),
    }
}
