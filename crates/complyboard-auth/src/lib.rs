//! Session continuity for the Complyboard client.
//!
//! Wraps the backend's JWT endpoints (`/api/token/`, `/api/token/refresh/`,
//! `/api/users/current/`) behind three collaborators:
//!
//! - [`ApiClient`] attaches bearer credentials to outgoing requests and
//!   silently refreshes an expired access token, deduplicating concurrent
//!   refresh attempts into one network call.
//! - [`AuthGate`] decides, per navigation, whether a protected route may
//!   render or the user is sent to sign-in.
//! - [`SessionContext`] owns login, the cached current-user profile, and
//!   logout.
//!
//! Token persistence lives in `complyboard-storage`; this crate is the only
//! place expiry is interpreted.

mod claims;
mod client;
mod error;
mod gate;
mod session;
mod types;

#[cfg(test)]
mod test_support;

pub use claims::{decode_expiry, is_expired};
pub use client::ApiClient;
pub use error::{AuthError, AuthResult, RefreshError};
pub use gate::{AuthGate, GateDecision, GateState, SIGN_IN_ROUTE};
pub use session::SessionContext;
pub use types::{Credentials, CurrentUser, RefreshedAccess, TokenPair};
