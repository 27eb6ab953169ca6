//! # Gamepanel Core
//!
//! Pure session logic layer - no HTTP or storage dependencies.
//!
//! This crate contains:
//! - The single-flight refresh coordinator
//! - Locally derived session state
//! - Port interfaces (traits) for session lifecycle notifications
//!
//! ## Architecture Principles
//! - Only depends on `gamepanel-domain`
//! - No HTTP, cookie, or platform code
//! - All external dependencies via traits

pub mod session;

pub use session::ports::{SessionListener, TeardownReason};
pub use session::refresh::{
    Generation, RefreshCoordinator, RefreshLeader, RefreshOutcome, RefreshPhase, RefreshTicket,
    RefreshWaiter,
};
pub use session::state::SessionState;
