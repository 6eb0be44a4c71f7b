//! CLI command implementations.

mod auth;

pub use auth::{login, logout, status, whoami};

use anyhow::Result;
use std::sync::Arc;

use complyboard_auth::{ApiClient, SessionContext};
use complyboard_core::{Config, Paths};

/// Build a session backed by the on-disk token store and the configured
/// backend URL.
pub fn build_session(config: &Config) -> Result<SessionContext> {
    let paths = Paths::new()?;
    let store = Arc::new(complyboard_storage::create_token_store(&paths)?);
    let client = ApiClient::new(store, config.api_base_url.clone());
    Ok(SessionContext::new(client))
}
