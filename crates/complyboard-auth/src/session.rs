//! Current-user session: login, profile cache, logout.

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use complyboard_storage::TokenStore;

use crate::client::ApiClient;
use crate::error::AuthResult;
use crate::types::{Credentials, CurrentUser};

/// Holds the logged-in user alongside the client used to manage them.
///
/// The cached profile is a mirror of the backend's answer, never a source
/// of truth: a failed fetch clears it while leaving the stored tokens
/// alone, so a later navigation can still try a refresh.
pub struct SessionContext {
    client: ApiClient,
    store: Arc<TokenStore>,
    current_user: Mutex<Option<CurrentUser>>,
}

impl SessionContext {
    pub fn new(client: ApiClient) -> Self {
        Self {
            store: Arc::clone(client.token_store()),
            client,
            current_user: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// The cached profile, if the last fetch succeeded.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.current_user.lock().unwrap().clone()
    }

    /// Exchange credentials for a token pair, persist it, and load the
    /// user's profile.
    ///
    /// Rejected credentials leave both the store and the cached profile
    /// untouched.
    pub async fn authenticate(&self, credentials: &Credentials) -> AuthResult<CurrentUser> {
        let pair = self.client.issue_token(credentials).await?;
        self.store.set_pair(&pair.access, &pair.refresh)?;
        info!(username = %credentials.username, "Credentials accepted, session established");
        self.fetch_current_user().await
    }

    /// Fetch the authenticated user's profile and cache it.
    ///
    /// On failure the cache is cleared but the token pair is kept; token
    /// disposal is the caller's decision, via [`SessionContext::logout`].
    pub async fn fetch_current_user(&self) -> AuthResult<CurrentUser> {
        match self.client.current_user().await {
            Ok(user) => {
                *self.current_user.lock().unwrap() = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                warn!(error = %err, "Failed to fetch current user");
                *self.current_user.lock().unwrap() = None;
                Err(err)
            }
        }
    }

    /// Drop the stored token pair and the cached profile.
    pub fn logout(&self) -> AuthResult<()> {
        self.store.clear_session()?;
        *self.current_user.lock().unwrap() = None;
        info!("Session cleared");
        Ok(())
    }
}
