// Structured logging setup for the CLI and the HTTP server

use crate::config::LogConfig;
use tracing::Level;

/// Parse the configured level, falling back to INFO.
pub fn max_level(config: &LogConfig) -> Level {
    config.level.parse().unwrap_or(Level::INFO)
}

/// Install the global fmt subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(config: &LogConfig) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level(config))
        .with_ansi(config.ansi)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
