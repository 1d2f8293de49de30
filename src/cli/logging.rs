//! Logging setup

use tracing_subscriber::{fmt, EnvFilter};

/// Filter directive for this crate's logs
///
/// A level requested on the command line wins over the configured one.
pub fn log_filter(flag_level: Option<tracing::Level>, configured_level: &str) -> String {
    let level = match flag_level {
        Some(level) => level.to_string().to_lowercase(),
        None => configured_level.trim().to_lowercase(),
    };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, replaces `directive` entirely.
pub fn init_logging(directive: &str, show_levels: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(show_levels)
        .init();
}
