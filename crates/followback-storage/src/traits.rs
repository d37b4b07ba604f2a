//! The key/value seam session persistence is written against.

use crate::StorageResult;

/// String key/value backend for session secrets.
///
/// Implementations are shared across threads and do their own locking.
pub trait SecureStorage: Send + Sync {
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Write several keys together. Backends that can commit them in one
    /// step override this; the fallback writes them one by one.
    fn set_many(&self, entries: &[(&str, &str)]) -> StorageResult<()> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Returns `false` when the key was already absent.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    fn contains(&self, key: &str) -> StorageResult<bool> {
        self.get(key).map(|value| value.is_some())
    }

    /// Delete several keys, stopping at the first backend error.
    /// Returns how many of them existed.
    fn delete_all(&self, keys: &[&str]) -> StorageResult<usize> {
        let mut removed = 0;
        for key in keys {
            if self.delete(key)? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
