//! Port interfaces for session lifecycle notifications
//!
//! These traits define the boundary between the client's session handling
//! and whatever the consumer keeps in sync with it (UI state, caches).

use async_trait::async_trait;

/// Why a local session was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownReason {
    /// The user logged out explicitly
    LoggedOut,
    /// A refresh attempt failed; the server no longer accepts the credential
    Expired,
}

/// Receives session lifecycle events from the API client
#[async_trait]
pub trait SessionListener: Send + Sync {
    /// Called exactly once per local teardown, after credentials are cleared
    async fn on_session_ended(&self, reason: TeardownReason);
}
