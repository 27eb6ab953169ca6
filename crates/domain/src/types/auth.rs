//! Authentication payloads and the signed-in user profile

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile of the signed-in panel user, as returned by login/refresh/me
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
    /// Effective permission keys (e.g. "servers.start")
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl UserProfile {
    pub fn has_permission(&self, key: &str) -> bool {
        self.permissions.iter().any(|p| p == key)
    }
}

/// Body sent to the login endpoint
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// Body returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserProfile,
    /// Seconds until the issued credential expires
    pub expires_in: u64,
}

/// Locally derived view of an established session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}
