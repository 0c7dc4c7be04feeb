// MediaJob Core - Domain Logic & Ports
// NO infrastructure dependencies (HTTP and terminal live in adapter crates)

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;

pub use config::TrackerConfig;
pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
