//! Durable token storage for the Complyboard client.
//!
//! Tokens persist across process restarts in a small JSON file under the
//! client base directory. The `TokenStorage` trait keeps the backend
//! swappable (tests use an in-memory map).

mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use tokens::{TokenKind, TokenStore};
pub use traits::TokenStorage;

use complyboard_core::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific storage error
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default file-backed storage under the client base directory.
pub fn create_storage(paths: &Paths) -> StorageResult<Box<dyn TokenStorage>> {
    let storage = FileStorage::open(paths.tokens_file())?;
    Ok(Box::new(storage))
}

/// Create a TokenStore with the default file-backed storage.
pub fn create_token_store(paths: &Paths) -> StorageResult<TokenStore> {
    let storage = create_storage(paths)?;
    Ok(TokenStore::new(storage))
}

