// Poller constants (no magic values)
use std::time::Duration;

/// Fixed delay between status queries (2s)
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Status queries per job before giving up (300 x 2s = 10 minutes)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 300;

/// Transport failures are fatal to the session unless configured otherwise
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 0;

/// Development address of the processing service
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
