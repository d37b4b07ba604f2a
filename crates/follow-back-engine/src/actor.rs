//! Remote account entity.

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

const DEFAULT_HANDLE_SUFFIX: &str = ".bsky.social";

/// An account as returned by the listing endpoints.
///
/// Identity is the DID. Handles can change between fetches, so equality and
/// hashing ignore every other field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub did: String,
    pub handle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Actor {
    pub fn new(did: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            did: did.into(),
            handle: handle.into(),
            display_name: None,
            avatar: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Human-facing name: the display name, else the handle without the
    /// default `.bsky.social` suffix.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name,
            _ => self
                .handle
                .strip_suffix(DEFAULT_HANDLE_SUFFIX)
                .unwrap_or(&self.handle),
        }
    }
}

impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        self.did == other.did
    }
}

impl Eq for Actor {}

impl Hash for Actor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.did.hash(state);
    }
}
