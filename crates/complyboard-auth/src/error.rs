//! Error types for session management.

use complyboard_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by authentication and session operations.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend rejected the request (credentials wrong, token stale, etc.)
    #[error("Request rejected by backend (HTTP {status})")]
    Rejected { status: u16 },

    /// Transport-level failure talking to the backend
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Token persistence failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A response body could not be decoded
    #[error("Invalid response payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// A silent token refresh failed
    #[error("Token refresh failed: {0}")]
    Refresh(#[from] RefreshError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Outcome of a token refresh, shared between every task that awaited it.
///
/// `Clone` is required so a single in-flight refresh can hand its result to
/// all waiters; error sources that are not `Clone` are carried as strings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("No refresh token available")]
    MissingRefreshToken,

    #[error("Refresh rejected by backend (HTTP {status})")]
    Rejected { status: u16 },

    #[error("Network error during refresh: {0}")]
    Network(String),

    #[error("Storage error during refresh: {0}")]
    Storage(String),
}

