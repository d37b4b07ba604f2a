//! Logging setup for the CLI.
//!
//! Every event goes to `~/.followback/logs/followback.jsonl` as JSONL. Stderr
//! only shows warnings unless `verbose_stderr` is set.

use std::path::PathBuf;
use tracing::Level;

const SERVICE_NAME: &str = "followback";

/// Install the global subscriber and return the active log file, if any.
///
/// `log_path` of `None` uses the default location.
pub fn init_logging(level: &str, log_path: Option<PathBuf>, verbose_stderr: bool) -> Option<PathBuf> {
    let file_level = directive(parse_level(level));
    let stderr_level = if verbose_stderr {
        file_level.clone()
    } else {
        directive(Level::WARN)
    };

    observability::init_with_config(observability::LogConfig {
        service_name: SERVICE_NAME.into(),
        default_level: file_level,
        log_path,
        also_stderr: true,
        stderr_level,
    })
}

/// Lenient level parsing: `warning` is accepted, anything unknown is `info`.
pub fn parse_level(level: &str) -> Level {
    let level = level.trim();
    if level.eq_ignore_ascii_case("warning") {
        return Level::WARN;
    }
    level.parse().unwrap_or(Level::INFO)
}

fn directive(level: Level) -> String {
    level.as_str().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_levels() {
        for (raw, expected) in [
            ("trace", Level::TRACE),
            ("debug", Level::DEBUG),
            ("info", Level::INFO),
            ("warn", Level::WARN),
            ("warning", Level::WARN),
            ("error", Level::ERROR),
        ] {
            assert_eq!(parse_level(raw), expected, "{}", raw);
        }
    }

    #[test]
    fn test_parse_ignores_case_and_padding() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level(" Warning "), Level::WARN);
    }

    #[test]
    fn test_unknown_level_is_info() {
        assert_eq!(parse_level(""), Level::INFO);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn test_directive_is_lowercase() {
        assert_eq!(directive(parse_level("WARNING")), "warn");
        assert_eq!(directive(Level::TRACE), "trace");
    }
}
