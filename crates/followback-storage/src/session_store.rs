//! Persisted account session.

use crate::{SecureStorage, StorageError, StorageKeys, StorageResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Authenticated account session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSession {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

impl fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredSession")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .field("email", &self.email)
            .field("access_jwt", &"<redacted>")
            .field("refresh_jwt", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
impl StoredSession {
    pub(crate) fn sample() -> Self {
        Self {
            did: "did:plc:alice".to_string(),
            handle: "alice.bsky.social".to_string(),
            email: Some("alice@example.com".to_string()),
            access_jwt: "access-1".to_string(),
            refresh_jwt: "refresh-1".to_string(),
        }
    }
}

/// Account metadata stored next to the tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    pub did: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
    /// When the session was last written
    pub saved_at: DateTime<Utc>,
}

/// High-level API for storing and retrieving the account session
pub struct SessionStore {
    storage: Box<dyn SecureStorage>,
}

impl SessionStore {
    pub fn new(storage: Box<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    /// Store the complete session (tokens + metadata).
    pub fn save_session(&self, session: &StoredSession) -> StorageResult<()> {
        let meta = SessionMeta {
            did: session.did.clone(),
            handle: session.handle.clone(),
            email: session.email.clone(),
            saved_at: Utc::now(),
        };
        let json =
            serde_json::to_string(&meta).map_err(|e| StorageError::Malformed(e.to_string()))?;

        // Tokens and metadata are committed together so a crash never pairs
        // a new access token with an old refresh token.
        self.storage.set_many(&[
            (StorageKeys::ACCESS_JWT, session.access_jwt.as_str()),
            (StorageKeys::REFRESH_JWT, session.refresh_jwt.as_str()),
            (StorageKeys::SESSION_META, json.as_str()),
        ])?;
        tracing::debug!(did = %session.did, "Session saved");
        Ok(())
    }

    /// Retrieve session metadata without the tokens.
    pub fn session_meta(&self) -> StorageResult<Option<SessionMeta>> {
        match self.storage.get(StorageKeys::SESSION_META)? {
            Some(json) => {
                let meta: SessionMeta = serde_json::from_str(&json)
                    .map_err(|e| StorageError::Malformed(e.to_string()))?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Load the stored session. Partial state counts as no session.
    pub fn load_session(&self) -> StorageResult<Option<StoredSession>> {
        let Some(meta) = self.session_meta()? else {
            return Ok(None);
        };
        let access_jwt = self.storage.get(StorageKeys::ACCESS_JWT)?;
        let refresh_jwt = self.storage.get(StorageKeys::REFRESH_JWT)?;

        match (access_jwt, refresh_jwt) {
            (Some(access_jwt), Some(refresh_jwt)) => Ok(Some(StoredSession {
                did: meta.did,
                handle: meta.handle,
                email: meta.email,
                access_jwt,
                refresh_jwt,
            })),
            _ => {
                tracing::warn!(did = %meta.did, "Session metadata present without tokens");
                Ok(None)
            }
        }
    }

    /// Check if a session exists
    pub fn has_session(&self) -> StorageResult<bool> {
        Ok(self.storage.contains(StorageKeys::REFRESH_JWT)?
            && self.storage.contains(StorageKeys::SESSION_META)?)
    }

    /// Remove every session key.
    pub fn clear_session(&self) -> StorageResult<()> {
        let removed = self.storage.delete_all(&StorageKeys::SESSION_KEYS)?;
        tracing::debug!(removed, "Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn store() -> SessionStore {
        SessionStore::new(Box::new(MemoryStorage::new()))
    }

    /// Memory storage that records each write call and its keys.
    #[derive(Default)]
    struct RecordingStorage {
        inner: MemoryStorage,
        writes: Arc<Mutex<Vec<Vec<String>>>>,
    }

    impl SecureStorage for RecordingStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.writes.lock().push(vec![key.to_string()]);
            self.inner.set(key, value)
        }

        fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
            self.writes
                .lock()
                .push(entries.iter().map(|(k, _)| k.to_string()).collect());
            self.inner.set_many(entries)
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> StorageResult<bool> {
            self.inner.delete(key)
        }
    }

    #[test]
    fn test_save_commits_tokens_and_meta_in_one_write() {
        let storage = RecordingStorage::default();
        let writes = storage.writes.clone();
        let store = SessionStore::new(Box::new(storage));

        store.save_session(&StoredSession::sample()).unwrap();

        let writes = writes.lock();
        assert_eq!(writes.len(), 1);
        let mut keys = writes[0].clone();
        keys.sort();
        let mut expected: Vec<_> = StorageKeys::SESSION_KEYS.iter().map(|k| k.to_string()).collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_save_and_load_session() {
        let store = store();
        assert!(store.load_session().unwrap().is_none());
        assert!(!store.has_session().unwrap());

        let session = StoredSession::sample();
        store.save_session(&session).unwrap();

        assert!(store.has_session().unwrap());
        assert_eq!(store.load_session().unwrap(), Some(session));
        assert_eq!(store.session_meta().unwrap().unwrap().handle, "alice.bsky.social");
    }

    #[test]
    fn test_save_overwrites_tokens() {
        let store = store();
        store.save_session(&StoredSession::sample()).unwrap();

        let mut refreshed = StoredSession::sample();
        refreshed.access_jwt = "access-2".to_string();
        refreshed.refresh_jwt = "refresh-2".to_string();
        store.save_session(&refreshed).unwrap();

        assert_eq!(store.load_session().unwrap().unwrap().access_jwt, "access-2");
    }

    #[test]
    fn test_clear_session() {
        let store = store();
        store.save_session(&StoredSession::sample()).unwrap();
        store.clear_session().unwrap();

        assert!(store.load_session().unwrap().is_none());
        assert!(!store.has_session().unwrap());
        // Clearing twice is fine.
        store.clear_session().unwrap();
    }

    #[test]
    fn test_partial_session_is_ignored() {
        let storage = MemoryStorage::new();
        storage
            .set(
                StorageKeys::SESSION_META,
                r#"{"did":"did:plc:x","handle":"x.test","saved_at":"2024-01-01T00:00:00Z"}"#,
            )
            .unwrap();
        let store = SessionStore::new(Box::new(storage));

        assert!(store.load_session().unwrap().is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", StoredSession::sample());
        assert!(rendered.contains("alice.bsky.social"));
        assert!(!rendered.contains("access-1"));
        assert!(!rendered.contains("refresh-1"));
    }
}
