//! Storage key constants.

/// Storage keys used by the client
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (short-lived bearer credential)
    pub const ACCESS_TOKEN: &'static str = "complyboard_access_token";

    /// Refresh token (exchanged for a new access token)
    pub const REFRESH_TOKEN: &'static str = "complyboard_refresh_token";
}
