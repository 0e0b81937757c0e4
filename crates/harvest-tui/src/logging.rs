use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone, Copy, Default)]
pub struct LogLevel {
    pub debug: bool,
    pub verbose: bool,
}

impl LogLevel {
    fn default_filter(self) -> &'static str {
        if self.verbose {
            "trace"
        } else if self.debug {
            "debug"
        } else {
            "info,harvest_core=debug"
        }
    }

    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_filter()))
    }
}

pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("harvest-assistant")
        .join("harvest.log")
}

/// Log to a file; the terminal belongs to the TUI.
pub fn init_file(level: LogLevel) -> Result<PathBuf> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = File::create(&path)?;

    tracing_subscriber::registry()
        .with(level.filter())
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(path)
}

pub fn init_stderr(level: LogLevel) {
    let filter = if level.debug || level.verbose {
        level.filter()
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(LogLevel::default().default_filter(), "info,harvest_core=debug");
        let debug = LogLevel { debug: true, verbose: false };
        assert_eq!(debug.default_filter(), "debug");
        let verbose = LogLevel { debug: true, verbose: true };
        assert_eq!(verbose.default_filter(), "trace");
    }

    #[test]
    fn test_log_file_lives_in_app_dir() {
        let path = log_file_path();
        assert!(path.ends_with("harvest-assistant/harvest.log"));
    }
}
