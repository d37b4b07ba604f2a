//! Storage key constants.

/// Storage keys used by the CLI
pub struct StorageKeys;

impl StorageKeys {
    /// Session access token
    pub const ACCESS_JWT: &'static str = "bsky_access_jwt";

    /// Session refresh token
    pub const REFRESH_JWT: &'static str = "bsky_refresh_jwt";

    /// Session account metadata (JSON)
    pub const SESSION_META: &'static str = "bsky_session_meta";

    /// Every key a saved session occupies
    pub const SESSION_KEYS: [&'static str; 3] =
        [Self::ACCESS_JWT, Self::REFRESH_JWT, Self::SESSION_META];
}
