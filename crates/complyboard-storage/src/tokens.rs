//! High-level API for the stored token pair.

use crate::{StorageKeys, StorageResult, TokenStorage};

/// Which credential a storage operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived bearer credential
    Access,
    /// Longer-lived credential exchanged for new access tokens
    Refresh,
}

impl TokenKind {
    fn storage_key(self) -> &'static str {
        match self {
            TokenKind::Access => StorageKeys::ACCESS_TOKEN,
            TokenKind::Refresh => StorageKeys::REFRESH_TOKEN,
        }
    }
}

/// High-level API for storing and retrieving the token pair.
///
/// Pure storage: no expiry logic lives here.
pub struct TokenStore {
    storage: Box<dyn TokenStorage>,
}

impl TokenStore {
    /// Create a new token store with the given storage backend.
    pub fn new(storage: Box<dyn TokenStorage>) -> Self {
        Self { storage }
    }

    /// Store a token, replacing any previous value of the same kind.
    pub fn set(&self, kind: TokenKind, value: &str) -> StorageResult<()> {
        self.storage.set(kind.storage_key(), value)
    }

    /// Retrieve a token.
    pub fn get(&self, kind: TokenKind) -> StorageResult<Option<String>> {
        self.storage.get(kind.storage_key())
    }

    /// Delete a token. Returns true if one was stored.
    pub fn clear(&self, kind: TokenKind) -> StorageResult<bool> {
        self.storage.delete(kind.storage_key())
    }

    /// Store a freshly issued access/refresh pair.
    pub fn set_pair(&self, access: &str, refresh: &str) -> StorageResult<()> {
        self.set(TokenKind::Access, access)?;
        self.set(TokenKind::Refresh, refresh)?;
        Ok(())
    }

    /// Check whether an access token is stored.
    pub fn has_access_token(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::ACCESS_TOKEN)
    }

    /// Clear both tokens (logout).
    ///
    /// Always attempts both deletes; a backend failure on either is
    /// propagated so callers never mistake a surviving session for a
    /// cleared one. Absent entries are not an error.
    pub fn clear_session(&self) -> StorageResult<()> {
        let access = self.storage.delete(StorageKeys::ACCESS_TOKEN);
        let refresh = self.storage.delete(StorageKeys::REFRESH_TOKEN);
        access?;
        refresh?;
        Ok(())
    }
}
