//! Configuration management.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default service URL (can be overridden at compile time via FOLLOWBACK_SERVICE_URL env var).
pub const DEFAULT_SERVICE_URL: &str = match option_env!("FOLLOWBACK_SERVICE_URL") {
    Some(url) => url,
    None => "https://bsky.social",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default page size requested from listing endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// Largest page size the graph endpoints accept.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Total attempts (initial call included) for a call that keeps failing with
/// an expired session.
pub const DEFAULT_MAX_AUTH_ATTEMPTS: u32 = 3;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Presentation language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ja,
}

impl Lang {
    /// Parse a language code such as `ja`, `ja_JP.UTF-8` or `en-US`.
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code
            .split(|c| c == '-' || c == '_' || c == '.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ja" => Some(Lang::Ja),
            "en" => Some(Lang::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ja => "ja",
        }
    }
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Base URL of the PDS / entryway.
    #[serde(default = "default_service_url")]
    pub service_url: String,
    /// Page size for follower/following/mute listings.
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// Attempt ceiling for calls failing with an expired session.
    #[serde(default = "default_max_auth_attempts")]
    pub max_auth_attempts: u32,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Give up immediately when resuming the session fails instead of
    /// retrying the call with the stale session.
    #[serde(default)]
    pub short_circuit_on_resume_failure: bool,
    /// Presentation language. `None` means derive from the system locale.
    #[serde(default)]
    pub lang: Option<Lang>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_max_auth_attempts() -> u32 {
    DEFAULT_MAX_AUTH_ATTEMPTS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            service_url: default_service_url(),
            page_limit: DEFAULT_PAGE_LIMIT,
            max_auth_attempts: DEFAULT_MAX_AUTH_ATTEMPTS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            short_circuit_on_resume_failure: false,
            lang: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults,
    /// then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| CoreError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_env(|name| std::env::var(name).ok());
    }

    fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(log_level) = non_empty("FOLLOWBACK_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Some(service_url) = non_empty("FOLLOWBACK_SERVICE_URL") {
            self.service_url = service_url;
        }
        if let Some(lang) = non_empty("FOLLOWBACK_LANG").and_then(|code| Lang::from_code(&code)) {
            self.lang = Some(lang);
        }
    }

    /// Reject values that cannot work against the service.
    pub fn validate(&self) -> CoreResult<()> {
        let url = self.service_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "service_url must be http(s), got {}",
                url.scheme()
            )));
        }
        if self.page_limit == 0 {
            return Err(CoreError::Config("page_limit must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Get the service URL as a parsed URL.
    pub fn service_url(&self) -> CoreResult<Url> {
        Url::parse(&self.service_url).map_err(CoreError::from)
    }

    /// Page size clamped to what the listing endpoints accept.
    pub fn effective_page_limit(&self) -> u32 {
        self.page_limit.clamp(1, MAX_PAGE_LIMIT)
    }

    /// Configured language, or the one derived from `LC_ALL` / `LANG`.
    pub fn effective_lang(&self) -> Lang {
        self.lang.unwrap_or_else(|| {
            ["LC_ALL", "LANG"]
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find_map(|code| Lang::from_code(&code))
                .unwrap_or_default()
        })
    }
}
