//! HTTP client with bearer attachment and silent token refresh.
//!
//! Every request first asks [`ApiClient::bearer_token`] for a credential.
//! A stored, unexpired access token is used as-is; an expired one triggers
//! a refresh against `/api/token/refresh/` before the request goes out.
//! Concurrent callers that hit an expired token at the same time share a
//! single in-flight refresh rather than each issuing their own.

use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use complyboard_storage::{TokenKind, TokenStore};

use crate::claims;
use crate::error::{AuthError, AuthResult, RefreshError};
use crate::types::{Credentials, CurrentUser, RefreshedAccess, TokenPair};

const TOKEN_PATH: &str = "/api/token/";
const REFRESH_PATH: &str = "/api/token/refresh/";
const CURRENT_USER_PATH: &str = "/api/users/current/";

#[derive(Serialize)]
struct RefreshRequest {
    refresh: String,
}

type SharedRefresh = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Authenticated HTTP client for the Complyboard backend.
///
/// Cheap to clone; all clones share the same token store and in-flight
/// refresh slot.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    store: Arc<TokenStore>,
    refresh_in_flight: Mutex<Option<SharedRefresh>>,
}

impl ApiClient {
    pub fn new(store: Arc<TokenStore>, base_url: String) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                base_url,
                store,
                refresh_in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn token_store(&self) -> &Arc<TokenStore> {
        &self.inner.store
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url.trim_end_matches('/'), path)
    }

    /// The bearer credential to attach to the next request, if any.
    ///
    /// Returns the stored access token when it is still valid, the result
    /// of a silent refresh when it has expired, and `None` when no usable
    /// credential can be produced. Requests without a credential still go
    /// out; the backend answers them with 401.
    pub async fn bearer_token(&self) -> Option<String> {
        let stored = match self.inner.store.get(TokenKind::Access) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Failed to read access token from storage");
                return None;
            }
        };
        let access = stored?;
        if !claims::is_expired(&access) {
            return Some(access);
        }

        debug!("Access token expired, refreshing before request");
        match self.refresh_access_token().await {
            Ok(fresh) => Some(fresh),
            Err(err) => {
                warn!(error = %err, "Token refresh failed, sending request without credential");
                None
            }
        }
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// If a refresh is already in flight, joins it instead of starting a
    /// second one; all waiters observe the same outcome. The stored token
    /// pair is left untouched on failure.
    pub async fn refresh_access_token(&self) -> Result<String, RefreshError> {
        let shared = {
            let mut slot = self.inner.refresh_in_flight.lock().unwrap();
            match slot.as_ref() {
                Some(existing) => existing.clone(),
                None => {
                    let fut = Self::perform_refresh(
                        self.inner.http.clone(),
                        self.endpoint(REFRESH_PATH),
                        Arc::clone(&self.inner.store),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        let outcome = shared.clone().await;

        // Clear the slot only if it still holds our future; a later refresh
        // may already have taken its place.
        let mut slot = self.inner.refresh_in_flight.lock().unwrap();
        if slot
            .as_ref()
            .map(|current| Shared::ptr_eq(current, &shared))
            .unwrap_or(false)
        {
            *slot = None;
        }

        outcome
    }

    async fn perform_refresh(
        http: reqwest::Client,
        url: String,
        store: Arc<TokenStore>,
    ) -> Result<String, RefreshError> {
        // Another task may have finished a refresh between our expiry check
        // and this future starting; reuse its token instead of burning the
        // refresh endpoint again.
        if let Ok(Some(current)) = store.get(TokenKind::Access) {
            if !claims::is_expired(&current) {
                return Ok(current);
            }
        }

        let refresh = store
            .get(TokenKind::Refresh)
            .map_err(|e| RefreshError::Storage(e.to_string()))?
            .ok_or(RefreshError::MissingRefreshToken)?;

        let response = http
            .post(&url)
            .json(&RefreshRequest { refresh })
            .send()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Token refresh rejected by backend");
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
            });
        }

        let payload: RefreshedAccess = response
            .json()
            .await
            .map_err(|e| RefreshError::Network(e.to_string()))?;
        store
            .set(TokenKind::Access, &payload.access)
            .map_err(|e| RefreshError::Storage(e.to_string()))?;
        info!("Access token refreshed");
        Ok(payload.access)
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, reqwest::Error> {
        let builder = match self.bearer_token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };
        builder.send().await
    }

    pub async fn get(&self, path: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.send(self.inner.http.get(self.endpoint(path))).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.send(self.inner.http.post(self.endpoint(path)).json(body))
            .await
    }

    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, reqwest::Error> {
        self.send(self.inner.http.put(self.endpoint(path)).json(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<reqwest::Response, reqwest::Error> {
        self.send(self.inner.http.delete(self.endpoint(path))).await
    }

    /// GET a JSON resource, treating any non-2xx status as a rejection.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AuthResult<T> {
        let response = self.get(path).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// POST credentials to `/api/token/` and return the issued pair.
    ///
    /// Does not touch the token store; callers decide whether to persist.
    pub async fn issue_token(&self, credentials: &Credentials) -> AuthResult<TokenPair> {
        let response = self
            .inner
            .http
            .post(self.endpoint(TOKEN_PATH))
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Credential check rejected by backend");
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(response.json().await?)
    }

    /// Fetch the profile of the authenticated user.
    pub async fn current_user(&self) -> AuthResult<CurrentUser> {
        self.get_json(CURRENT_USER_PATH).await
    }
}
