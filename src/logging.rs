// src/logging.rs

//! Opt-in logging setup using `tracing` + `tracing-subscriber`.
//!
//! The library itself only emits `tracing` events and never installs a
//! subscriber; embedding applications that want quick console output can
//! call [`init_logging`] once at startup instead of wiring their own.
//!
//! The log level comes from the `RUNDAG_LOG` environment variable
//! (e.g. "info", "debug"), defaulting to `info`. Logs go to STDERR.

use tracing_subscriber::fmt;

/// Initialise a global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging() {
    let level = std::env::var("RUNDAG_LOG")
        .ok()
        .and_then(|s| parse_level_str(&s))
        .unwrap_or(tracing::Level::INFO);

    // Send logs to stderr; keep stdout free for the embedding application.
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
