//! Error types for XRPC calls.
//!
//! Every variant converts into the engine's [`ApiError`]; only expired or
//! invalid sessions become [`ApiError::AuthRequired`].

use follow_back_engine::ApiError;
use thiserror::Error;

/// XRPC error names that mean the session must be re-established.
const AUTH_ERROR_NAMES: [&str; 3] = ["ExpiredToken", "InvalidToken", "AuthenticationRequired"];

#[derive(Debug, Error)]
pub enum XrpcError {
    /// Network or transport-level failure from reqwest.
    ///
    /// Includes connection failures, timeouts, and TLS errors.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("XRPC error: {status} {error} - {message}")]
    Xrpc {
        status: u16,
        /// XRPC error name, e.g. `ExpiredToken` or `RateLimitExceeded`.
        error: String,
        message: String,
    },

    /// Response body did not match the expected schema.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid service URL or client setup.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl XrpcError {
    /// Returns true if the failure means the session is expired or invalid.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            XrpcError::Xrpc { status, error, .. } => {
                *status == 401 || (*status == 400 && AUTH_ERROR_NAMES.contains(&error.as_str()))
            }
            _ => false,
        }
    }
}

impl From<XrpcError> for ApiError {
    fn from(err: XrpcError) -> Self {
        if err.is_auth_failure() {
            return match err {
                XrpcError::Xrpc { error, .. } => ApiError::AuthRequired(error),
                other => ApiError::AuthRequired(other.to_string()),
            };
        }
        match err {
            XrpcError::Http(e) if e.is_decode() => ApiError::Decode(e.to_string()),
            XrpcError::Http(e) => ApiError::Transport(e.to_string()),
            XrpcError::Xrpc {
                status,
                error,
                message,
            } => ApiError::Rejected {
                status,
                error,
                message,
            },
            XrpcError::Json(e) => ApiError::Decode(e.to_string()),
            XrpcError::Config(msg) => ApiError::Transport(msg),
        }
    }
}

pub type XrpcResult<T> = Result<T, XrpcError>;
