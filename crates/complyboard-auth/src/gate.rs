//! Per-navigation authentication gate.
//!
//! Each protected navigation runs its own evaluation, an explicit finite
//! state machine rather than ad-hoc boolean checks:
//!
//! ```text
//! ┌──────────┐ BeginEvaluation ┌────────────┐ TokenValid        ┌───────────────┐
//! │ Unknown  │ ──────────────► │ Evaluating │ ────────────────► │ Authenticated │
//! └──────────┘                 └─────┬──────┘                   └───────────────┘
//!                                    │ TokenExpired                     ▲
//!                                    ▼                RefreshSucceeded  │
//!                              ┌────────────┐ ──────────────────────────┘
//!                              │ Refreshing │
//!                              └─────┬──────┘ RefreshFailed
//!              MissingCredentials    ▼
//!                    └────────► Unauthenticated
//! ```
//!
//! Exactly one refresh attempt per evaluation; a second expiry within the
//! same navigation means the session is over.

use std::sync::Arc;

use rust_fsm::*;
use tracing::{debug, warn};

use complyboard_storage::{TokenKind, TokenStore};

use crate::claims;
use crate::client::ApiClient;

/// Route unauthenticated navigations are redirected to.
pub const SIGN_IN_ROUTE: &str = "/auth/sign-in";

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub gate_machine(Unknown)

    Unknown => {
        BeginEvaluation => Evaluating
    },
    Evaluating => {
        TokenValid => Authenticated,
        MissingCredentials => Unauthenticated,
        TokenExpired => Refreshing
    },
    Refreshing => {
        RefreshSucceeded => Authenticated,
        RefreshFailed => Unauthenticated
    }
}

pub use gate_machine::Input as GateMachineInput;
pub use gate_machine::State as GateMachineState;
pub use gate_machine::StateMachine as GateMachine;

/// Simplified view of the evaluation state, for rendering decisions.
///
/// While an evaluation is in progress the caller shows a loading view, not
/// the protected content and not the sign-in page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Evaluating,
    Refreshing,
    Authenticated,
    Unauthenticated,
}

impl GateState {
    pub fn is_settled(&self) -> bool {
        matches!(self, GateState::Authenticated | GateState::Unauthenticated)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, GateState::Authenticated)
    }
}

impl From<&GateMachineState> for GateState {
    fn from(state: &GateMachineState) -> Self {
        match state {
            GateMachineState::Unknown => GateState::Unknown,
            GateMachineState::Evaluating => GateState::Evaluating,
            GateMachineState::Refreshing => GateState::Refreshing,
            GateMachineState::Authenticated => GateState::Authenticated,
            GateMachineState::Unauthenticated => GateState::Unauthenticated,
        }
    }
}

/// Outcome of evaluating a protected navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Render the requested route.
    Authenticated,
    /// Redirect to [`SIGN_IN_ROUTE`], remembering where the user was going.
    RedirectToSignIn { from: String },
}

/// Guards protected routes.
///
/// Stateless between navigations: every call to [`AuthGate::evaluate`]
/// starts from `Unknown` and runs the machine to a settled state.
pub struct AuthGate {
    store: Arc<TokenStore>,
    client: ApiClient,
}

impl AuthGate {
    pub fn new(client: ApiClient) -> Self {
        Self {
            store: Arc::clone(client.token_store()),
            client,
        }
    }

    /// Decide whether a navigation to `requested_path` may proceed.
    ///
    /// Reads only local storage when the stored access token is missing or
    /// still valid; touches the network at most once, for the single
    /// refresh attempt an expired token is granted.
    pub async fn evaluate(&self, requested_path: &str) -> GateDecision {
        let mut machine = GateMachine::new();
        Self::step(&mut machine, &GateMachineInput::BeginEvaluation);

        let access = match self.store.get(TokenKind::Access) {
            Ok(access) => access,
            Err(err) => {
                warn!(error = %err, "Failed to read access token during navigation");
                None
            }
        };

        match access {
            None => {
                debug!(path = requested_path, "No access token stored");
                Self::step(&mut machine, &GateMachineInput::MissingCredentials);
            }
            Some(token) if !claims::is_expired(&token) => {
                Self::step(&mut machine, &GateMachineInput::TokenValid);
            }
            Some(_) => {
                Self::step(&mut machine, &GateMachineInput::TokenExpired);
                match self.client.refresh_access_token().await {
                    Ok(_) => Self::step(&mut machine, &GateMachineInput::RefreshSucceeded),
                    Err(err) => {
                        warn!(error = %err, path = requested_path, "Refresh failed during navigation");
                        Self::step(&mut machine, &GateMachineInput::RefreshFailed);
                    }
                }
            }
        }

        self.decision(GateState::from(machine.state()), requested_path)
    }

    fn decision(&self, state: GateState, requested_path: &str) -> GateDecision {
        if state.is_authenticated() {
            GateDecision::Authenticated
        } else {
            debug!(path = requested_path, "Navigation denied, redirecting to sign-in");
            GateDecision::RedirectToSignIn {
                from: requested_path.to_string(),
            }
        }
    }

    fn step(machine: &mut GateMachine, input: &GateMachineInput) {
        // All transitions driven here are defined by the machine; log a
        // refused one rather than panicking.
        if machine.consume(input).is_err() {
            warn!(state = ?machine.state(), input = ?input, "Refused gate transition");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{json_response, make_token, TestServer};
    use complyboard_storage::MemoryStorage;

    fn gate_over(server: &TestServer) -> (AuthGate, Arc<TokenStore>) {
        let store = Arc::new(TokenStore::new(Box::new(MemoryStorage::new())));
        let client = ApiClient::new(Arc::clone(&store), server.base_url());
        (AuthGate::new(client), store)
    }

    fn fresh_token() -> String {
        make_token(chrono::Utc::now().timestamp() + 3600)
    }

    fn stale_token() -> String {
        make_token(chrono::Utc::now().timestamp() - 3600)
    }

    #[tokio::test]
    async fn test_valid_token_allows_navigation_without_network() {
        let server = TestServer::spawn(Arc::new(|_req| json_response(500, "{}"))).await;
        let (gate, store) = gate_over(&server);
        store.set_pair(&fresh_token(), "refresh-token").unwrap();

        let decision = gate.evaluate("/reports/42").await;
        assert_eq!(decision, GateDecision::Authenticated);
        assert_eq!(server.requests().len(), 0);
    }

    #[tokio::test]
    async fn test_missing_token_redirects_without_network() {
        let server = TestServer::spawn(Arc::new(|_req| json_response(500, "{}"))).await;
        let (gate, _store) = gate_over(&server);

        let decision = gate.evaluate("/reports/42").await;
        assert_eq!(
            decision,
            GateDecision::RedirectToSignIn {
                from: "/reports/42".to_string()
            }
        );
        assert_eq!(server.requests().len(), 0);
    }

    #[tokio::test]
    async fn test_expired_token_refreshed_then_allowed() {
        let new_access = fresh_token();
        let body = format!(r#"{{"access":"{new_access}"}}"#);
        let server = TestServer::spawn(Arc::new(move |req| match req.path.as_str() {
            "/api/token/refresh/" => json_response(200, &body),
            _ => json_response(404, "{}"),
        }))
        .await;
        let (gate, store) = gate_over(&server);
        store.set_pair(&stale_token(), "refresh-token").unwrap();

        let decision = gate.evaluate("/reports/42").await;
        assert_eq!(decision, GateDecision::Authenticated);
        assert_eq!(server.hits("/api/token/refresh/"), 1);
        assert_eq!(store.get(TokenKind::Access).unwrap(), Some(new_access));
    }

    #[tokio::test]
    async fn test_expired_token_failed_refresh_redirects() {
        let server = TestServer::spawn(Arc::new(|req| match req.path.as_str() {
            "/api/token/refresh/" => json_response(401, r#"{"detail":"Token is invalid"}"#),
            _ => json_response(404, "{}"),
        }))
        .await;
        let (gate, store) = gate_over(&server);
        let stale = stale_token();
        store.set_pair(&stale, "stale-refresh").unwrap();

        let decision = gate.evaluate("/settings").await;
        assert_eq!(
            decision,
            GateDecision::RedirectToSignIn {
                from: "/settings".to_string()
            }
        );
        // One attempt only, and the pair is left in place
        assert_eq!(server.hits("/api/token/refresh/"), 1);
        assert_eq!(store.get(TokenKind::Access).unwrap(), Some(stale));
    }

    #[tokio::test]
    async fn test_expired_token_without_refresh_token_redirects() {
        let server = TestServer::spawn(Arc::new(|_req| json_response(500, "{}"))).await;
        let (gate, store) = gate_over(&server);
        store.set(TokenKind::Access, &stale_token()).unwrap();

        let decision = gate.evaluate("/reports").await;
        assert_eq!(
            decision,
            GateDecision::RedirectToSignIn {
                from: "/reports".to_string()
            }
        );
        assert_eq!(server.requests().len(), 0);
    }

    #[tokio::test]
    async fn test_each_navigation_evaluates_independently() {
        let server = TestServer::spawn(Arc::new(|_req| json_response(500, "{}"))).await;
        let (gate, store) = gate_over(&server);

        assert_eq!(
            gate.evaluate("/reports").await,
            GateDecision::RedirectToSignIn {
                from: "/reports".to_string()
            }
        );

        // Signing in between navigations flips the next decision
        store.set_pair(&fresh_token(), "refresh-token").unwrap();
        assert_eq!(gate.evaluate("/reports").await, GateDecision::Authenticated);
    }

    #[test]
    fn test_machine_requires_refresh_before_authenticated() {
        let mut machine = GateMachine::new();
        machine.consume(&GateMachineInput::BeginEvaluation).unwrap();
        machine.consume(&GateMachineInput::TokenExpired).unwrap();
        assert_eq!(*machine.state(), GateMachineState::Refreshing);

        // Cannot settle as authenticated without a refresh outcome
        assert!(machine.consume(&GateMachineInput::TokenValid).is_err());
        machine.consume(&GateMachineInput::RefreshSucceeded).unwrap();
        assert_eq!(*machine.state(), GateMachineState::Authenticated);
    }

    #[test]
    fn test_gate_state_view() {
        assert!(!GateState::Unknown.is_settled());
        assert!(!GateState::Evaluating.is_settled());
        assert!(!GateState::Refreshing.is_settled());
        assert!(GateState::Authenticated.is_settled());
        assert!(GateState::Unauthenticated.is_settled());
        assert!(GateState::Authenticated.is_authenticated());
        assert!(!GateState::Unauthenticated.is_authenticated());
    }
}
