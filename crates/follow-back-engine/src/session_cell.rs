//! Single-owner holder for the current session.

use crate::{ApiError, Session};
use std::sync::{PoisonError, RwLock};

/// Holds the session between remote calls.
///
/// Readers take a clone per call. The lock is never held across an `.await`,
/// so a poisoned lock can only come from a panic inside these methods and the
/// inner value is still consistent.
#[derive(Debug, Default)]
pub struct SessionCell {
    inner: RwLock<Option<Session>>,
}

impl SessionCell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session, if any.
    pub fn get(&self) -> Option<Session> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current session or [`ApiError::NotLoggedIn`].
    pub fn require(&self) -> Result<Session, ApiError> {
        self.get().ok_or(ApiError::NotLoggedIn)
    }

    pub fn replace(&self, session: Session) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    pub fn clear(&self) -> Option<Session> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
