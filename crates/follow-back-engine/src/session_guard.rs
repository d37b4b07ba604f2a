//! Self-healing wrapper for authenticated calls.

use crate::{ApiError, RelationshipApi, SessionCell, SessionPersistence};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Total attempts for a call that keeps failing with an expired session:
/// the initial call plus two retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// What to do when resuming the session fails between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResumeFailurePolicy {
    /// Log the resume failure and retry the call with whatever session is held.
    #[default]
    RetryAnyway,
    /// Stop and return [`ApiError::ResumeFailed`].
    ShortCircuit,
}

/// Side effect that re-establishes the session after expiry.
#[async_trait]
pub trait SessionResumer: Send + Sync {
    async fn resume(&self) -> Result<(), ApiError>;
}

/// Resumes from the session in memory, falling back to the persisted one
/// when nothing is held, then publishes the fresh session to the cell and
/// to persistence.
pub struct StoredSessionResumer {
    api: Arc<dyn RelationshipApi>,
    cell: Arc<SessionCell>,
    persistence: Arc<dyn SessionPersistence>,
}

impl StoredSessionResumer {
    pub fn new(
        api: Arc<dyn RelationshipApi>,
        cell: Arc<SessionCell>,
        persistence: Arc<dyn SessionPersistence>,
    ) -> Self {
        Self {
            api,
            cell,
            persistence,
        }
    }
}

#[async_trait]
impl SessionResumer for StoredSessionResumer {
    async fn resume(&self) -> Result<(), ApiError> {
        // The cell holds the live session; disk may lag behind a failed save.
        let current = self
            .cell
            .get()
            .or_else(|| self.persistence.load())
            .ok_or(ApiError::NotLoggedIn)?;

        let fresh = self.api.resume_session(&current).await?;
        info!(did = %fresh.did, handle = %fresh.handle, "Session resumed");

        self.cell.replace(fresh.clone());
        self.persistence.save(&fresh);
        Ok(())
    }
}

/// Retries a call after resuming the session when it fails with
/// [`ApiError::AuthRequired`], up to a fixed number of total attempts.
#[derive(Clone)]
pub struct SessionGuard {
    resumer: Arc<dyn SessionResumer>,
    max_attempts: u32,
    policy: ResumeFailurePolicy,
}

impl SessionGuard {
    pub fn new(resumer: Arc<dyn SessionResumer>) -> Self {
        Self {
            resumer,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            policy: ResumeFailurePolicy::default(),
        }
    }

    /// Set the attempt ceiling. Zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_policy(mut self, policy: ResumeFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `op`, resuming and re-running it while it reports an expired
    /// session. `op` must read the session afresh on every invocation.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;

        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_auth_required() => e,
                Err(e) => return Err(e),
            };

            if attempt >= self.max_attempts {
                warn!(
                    operation = %operation,
                    attempts = attempt,
                    "Session still expired after final attempt"
                );
                return Err(err);
            }

            debug!(
                operation = %operation,
                attempt,
                max_attempts = self.max_attempts,
                "Session expired, resuming before retry"
            );

            if let Err(resume_err) = self.resumer.resume().await {
                match self.policy {
                    ResumeFailurePolicy::ShortCircuit => {
                        warn!(operation = %operation, error = %resume_err, "Session resume failed");
                        return Err(ApiError::ResumeFailed(Box::new(resume_err)));
                    }
                    ResumeFailurePolicy::RetryAnyway => {
                        warn!(
                            operation = %operation,
                            error = %resume_err,
                            "Session resume failed, retrying with current session"
                        );
                    }
                }
            }

            attempt += 1;
        }
    }
}
