//! # Observability
//!
//! Process-wide structured logging for followback.
//!
//! [`init_with_config`] installs one global `tracing` subscriber with two
//! layers:
//!
//! - a [`JsonLayer`] appending one JSON object per event to a log file
//!   (`~/.followback/logs/followback.jsonl` unless overridden)
//! - a compact human-readable layer on stderr, with its own level
//!
//! Each layer reads `RUST_LOG` first and falls back to its configured level.
//! If the log file cannot be opened, logging degrades to stderr only.
//!
//! Inspect the file with `tail -f ~/.followback/logs/followback.jsonl | jq`.

mod file_sink;
mod json_layer;

pub use file_sink::LogFileWriter;
pub use json_layer::{JsonLayer, LogEntry};

use std::io;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Configuration for the logging system.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Included in every JSON line as `service`.
    pub service_name: String,

    /// Level for the file layer when `RUST_LOG` is unset.
    pub default_level: String,

    /// Log file override. `None` uses [`default_log_path`].
    pub log_path: Option<PathBuf>,

    /// Install the stderr layer even when the file layer works.
    pub also_stderr: bool,

    /// Level for the stderr layer when `RUST_LOG` is unset.
    pub stderr_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "followback".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
            stderr_level: "warn".into(),
        }
    }
}

impl LogConfig {
    pub fn resolved_log_path(&self) -> PathBuf {
        self.log_path.clone().unwrap_or_else(default_log_path)
    }
}

/// `~/.followback/logs/followback.jsonl`, or under the temp dir without a home.
pub fn default_log_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".followback")
        .join("logs")
        .join("followback.jsonl")
}

fn level_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber.
///
/// Returns the log file path when the file layer is active. Calling this
/// again after a subscriber is installed does nothing.
pub fn init_with_config(config: LogConfig) -> Option<PathBuf> {
    let log_path = config.resolved_log_path();

    let writer = match LogFileWriter::open(&log_path) {
        Ok(writer) => Some(writer),
        Err(e) => {
            eprintln!(
                "followback: logging to stderr only, cannot open {}: {}",
                log_path.display(),
                e
            );
            None
        }
    };
    let file_active = writer.is_some();

    let file_layer = writer.map(|writer| {
        JsonLayer::new(config.service_name.clone(), writer)
            .with_filter(level_filter(&config.default_level))
    });

    let stderr_layer = (config.also_stderr || !file_active).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(io::stderr)
            .with_filter(level_filter(&config.stderr_level))
    });

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.service_name,
            log_path = %log_path.display(),
            file_active,
            "Logging initialized"
        );
    }

    file_active.then_some(log_path)
}
