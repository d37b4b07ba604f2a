//! Session persistence seam.

use crate::Session;
use followback_storage::SessionStore;
use tracing::warn;

/// Where the session survives between runs.
///
/// Persistence is never allowed to fail an operation: saving and clearing
/// log and move on, and unreadable data loads as no session.
pub trait SessionPersistence: Send + Sync {
    fn save(&self, session: &Session);

    fn load(&self) -> Option<Session>;

    fn clear(&self);
}

impl SessionPersistence for SessionStore {
    fn save(&self, session: &Session) {
        if let Err(e) = self.save_session(session) {
            warn!(did = %session.did, error = %e, "Failed to persist session");
        }
    }

    fn load(&self) -> Option<Session> {
        match self.load_session() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Stored session unreadable, ignoring it");
                None
            }
        }
    }

    fn clear(&self) {
        if let Err(e) = self.clear_session() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }
}
