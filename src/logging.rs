//! Logging setup.
//!
//! The terminal is owned by the UI, so events go to a log file only. With no
//! file configured, no subscriber is installed and events are dropped.

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::LoggingSettings;

/// Parse log level string to tracing Level.
fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install the global subscriber described by `settings`.
pub fn init(settings: &LoggingSettings) -> io::Result<()> {
    let Some(path) = settings.file.as_deref() else {
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let log_file = OpenOptions::new().create(true).append(true).open(path)?;
    let log_file = Arc::new(log_file);

    let level = parse_level(&settings.level);
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true),
        )
        .with(filter)
        .try_init()
        .map_err(io::Error::other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_accepts_aliases_and_defaults_to_info() {
        assert_eq!(parse_level("WARNING"), Level::WARN);
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn init_without_file_is_a_no_op() {
        let settings = LoggingSettings {
            level: "info".to_string(),
            file: None,
        };
        assert!(init(&settings).is_ok());
    }
}
