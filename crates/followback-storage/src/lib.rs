//! Session persistence for the followback CLI.
//!
//! The account session lives in `~/.followback/session.json`, a flat JSON
//! object of string keys written atomically with owner-only permissions.
//! [`MemoryStorage`] stands in where nothing may touch disk.

mod error;
mod file;
mod keys;
mod memory;
mod session_store;
mod traits;

pub use error::{StorageError, StorageResult};
pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use session_store::{SessionMeta, SessionStore, StoredSession};
pub use traits::SecureStorage;

use followback_config_and_utils::Paths;

/// Open the session file under `paths` and wrap it in a [`SessionStore`].
pub fn create_session_store(paths: &Paths) -> StorageResult<SessionStore> {
    let storage = FileStorage::new(paths.session_file())?;
    Ok(SessionStore::new(Box::new(storage)))
}
