//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// HTTP defaults
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;
pub const DEFAULT_USER_AGENT: &str = concat!("gamepanel-client/", env!("CARGO_PKG_VERSION"));
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// Identity service endpoints
pub const LOGIN_PATH: &str = "/auth/login";
pub const REFRESH_PATH: &str = "/auth/refresh";
pub const LOGOUT_PATH: &str = "/auth/logout";
pub const ME_PATH: &str = "/auth/me";

// Session lifetime
pub const DEFAULT_REFRESH_LEEWAY_SECS: u64 = 60;

// Error reporting
pub const MAX_ERROR_BODY_LENGTH: usize = 500;
pub const GENERIC_ERROR_MESSAGE: &str = "Request failed";

// Logging
pub const DEFAULT_LOG_FILTER: &str = "info";
