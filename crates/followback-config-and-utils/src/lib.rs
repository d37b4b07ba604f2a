//! Configuration, paths, errors and logging setup shared by the followback crates.

mod config;
mod error;
mod logging;
mod paths;

pub use config::{
    Config, Lang, DEFAULT_LOG_LEVEL, DEFAULT_MAX_AUTH_ATTEMPTS, DEFAULT_PAGE_LIMIT,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVICE_URL, MAX_PAGE_LIMIT,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level};
pub use paths::Paths;
