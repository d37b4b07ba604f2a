//! Errors raised while loading configuration and resolving paths.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    /// A setting holds a value the client cannot use.
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot parse {}: {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid service URL: {0}")]
    ServiceUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Home directory not found; cannot place ~/.followback")]
    NoHomeDir,
}

pub type CoreResult<T> = Result<T, CoreError>;
