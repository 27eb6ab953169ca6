//! Gamepanel REST API client
//!
//! This module provides the authenticated HTTP client for the panel backend
//! and typed wrappers for each resource.
//!
//! # Architecture
//!
//! - [`HttpClient`](crate::http::HttpClient) for transport, timeouts and
//!   idempotent retries
//! - [`CredentialStore`] holds the opaque session credentials
//! - Single-flight session refresh through `gamepanel_core::RefreshCoordinator`
//! - Resource accessors (`client.servers()`, `client.backups()`, ...) on top
//!   of [`ApiClient::request`]

pub mod auth;
pub mod client;
pub mod credentials;
pub mod errors;
pub mod request;
pub mod resources;

pub use client::{ApiClient, ApiClientBuilder};
pub use credentials::{CookieCredentialStore, CredentialStore};
pub use errors::{ApiError, ApiErrorCategory};
pub use request::RequestOptions;
pub use resources::{
    Activity, Alerts, Backups, Dashboard, Mods, Permissions, Players, Servers, Settings, Tasks,
    Users,
};
