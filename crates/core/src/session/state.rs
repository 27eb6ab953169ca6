//! Locally derived session state
//!
//! The credential itself is opaque (it lives in the credential store), so the
//! client tracks its lifecycle indirectly: whether a session was established,
//! who it belongs to, and when the declared `expiresIn` runs out.

use std::time::Duration;

use chrono::{DateTime, Utc};
use gamepanel_domain::{AuthSession, UserProfile};
use parking_lot::RwLock;

/// Upper bound applied to declared lifetimes and leeways (one year)
const MAX_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

#[derive(Default)]
pub struct SessionState {
    current: RwLock<Option<AuthSession>>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a login or refresh response.
    pub fn establish(&self, user: UserProfile, expires_in_secs: u64) -> AuthSession {
        let lifetime = to_chrono(Duration::from_secs(expires_in_secs));
        let expires_at = Utc::now() + lifetime;

        let session = AuthSession { user, expires_at };
        *self.current.write() = Some(session.clone());
        session
    }

    /// Replace the cached profile without touching the expiry
    pub fn update_user(&self, user: UserProfile) {
        if let Some(session) = self.current.write().as_mut() {
            session.user = user;
        }
    }

    pub fn current(&self) -> Option<AuthSession> {
        self.current.read().clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.current.read().as_ref().map(|s| s.user.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.read().is_some()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().as_ref().map(|s| s.expires_at)
    }

    /// True once `expires_at - leeway` has passed. False without a session.
    pub fn needs_refresh(&self, leeway: Duration) -> bool {
        self.time_until_refresh(leeway).is_some_and(|remaining| remaining.is_zero())
    }

    /// Time left before a proactive refresh is due, saturating at zero.
    pub fn time_until_refresh(&self, leeway: Duration) -> Option<Duration> {
        let expires_at = self.expires_at()?;
        let refresh_at = expires_at - to_chrono(leeway);

        Some((refresh_at - Utc::now()).to_std().unwrap_or(Duration::ZERO))
    }

    /// Clear the session, returning what was there
    pub fn teardown(&self) -> Option<AuthSession> {
        self.current.write().take()
    }
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration.min(MAX_LIFETIME))
        .unwrap_or_else(|_| chrono::Duration::zero())
}
