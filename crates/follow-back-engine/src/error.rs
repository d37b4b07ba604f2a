//! Engine error types.

use thiserror::Error;

/// Error returned across the remote relationship boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The session is missing, expired or revoked. The only retryable kind.
    #[error("Authentication required: {0}")]
    AuthRequired(String),

    /// The service answered with a non-auth error.
    #[error("Request rejected (HTTP {status}, {error}): {message}")]
    Rejected {
        status: u16,
        error: String,
        message: String,
    },

    /// Connection, timeout or other transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Re-establishing the session failed while recovering from expiry
    #[error("Session resume failed: {0}")]
    ResumeFailed(Box<ApiError>),

    /// No session is held
    #[error("Not logged in")]
    NotLoggedIn,
}

impl ApiError {
    /// Returns true if the call may succeed after the session is resumed.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ApiError::AuthRequired(_))
    }
}

/// Lifecycle error type.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Login failed: {0}")]
    LoginFailed(#[source] ApiError),

    #[error("Fetching relationships failed: {0}")]
    FetchFailed(#[source] ApiError),

    #[error("Session resume failed: {0}")]
    SessionResumeFailed(#[source] ApiError),

    #[error("Not logged in")]
    NotLoggedIn,

    /// Invalid state transition in the lifecycle FSM
    #[error("Invalid phase transition: {0}")]
    InvalidPhaseTransition(String),
}

/// Result type alias using EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
