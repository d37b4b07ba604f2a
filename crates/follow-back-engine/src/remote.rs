//! Remote relationship service boundary.

use crate::{Actor, ApiError, Page, Session};
use async_trait::async_trait;
use std::fmt;

/// Login credentials. The password never appears in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    pub identifier: String,
    password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the engine needs from the social graph service.
///
/// Implementations map an expired or revoked session to
/// [`ApiError::AuthRequired`]; every other failure must use another variant.
#[async_trait]
pub trait RelationshipApi: Send + Sync {
    /// Create a new session from an identifier (handle or email) and password.
    async fn login(&self, identifier: &str, password: &str) -> Result<Session, ApiError>;

    /// Re-establish a previously persisted session, returning fresh tokens.
    async fn resume_session(&self, session: &Session) -> Result<Session, ApiError>;

    /// Accounts following `actor`.
    async fn list_followers(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError>;

    /// Accounts `actor` follows.
    async fn list_followings(
        &self,
        session: &Session,
        actor: &str,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError>;

    /// Accounts the session owner has muted.
    async fn list_mutes(
        &self,
        session: &Session,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<Page<Actor>, ApiError>;

    /// Follow `target` as the session owner. Returns the created record URI.
    async fn create_follow(&self, session: &Session, target: &Actor) -> Result<String, ApiError>;
}
