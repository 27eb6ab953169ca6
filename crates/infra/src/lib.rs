//! # Gamepanel Infrastructure
//!
//! HTTP implementation of the Gamepanel client.
//!
//! This crate contains:
//! - The authenticated API client and typed resource wrappers
//! - Credential storage (cookie jar)
//! - The HTTP transport with timeouts and idempotent retries
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements the session ports defined in `gamepanel-core`
//! - Depends on `gamepanel-domain` and `gamepanel-core`
//! - Contains all "impure" code (network I/O, env and file access)

pub mod api;
pub mod config;
mod errors;
pub mod http;
pub mod observability;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiClientBuilder, ApiError, ApiErrorCategory, CookieCredentialStore,
    CredentialStore, RequestOptions,
};
pub use http::{HttpClient, HttpClientBuilder};
pub use observability::init_tracing;
