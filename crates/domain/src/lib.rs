//! # Gamepanel Domain
//!
//! Business domain types and models for the Gamepanel control-panel client.
//!
//! This crate contains:
//! - Resource models (servers, backups, players, mods, tasks, alerts, ...)
//! - Authentication payloads and the user profile
//! - Domain error types, error codes and Result definitions
//! - Configuration structures
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other Gamepanel crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
