//! Wire types exchanged with the backend auth endpoints.

use serde::{Deserialize, Serialize};

/// Login credentials, posted to `/api/token/`.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Access/refresh pair returned by `/api/token/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// New access token returned by `/api/token/refresh/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshedAccess {
    pub access: String,
}

/// Profile returned by `/api/users/current/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}
