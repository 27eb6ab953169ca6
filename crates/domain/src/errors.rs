//! Error types used throughout the application

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Gamepanel domain operations
#[derive(Error, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum PanelError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Gamepanel operations
pub type Result<T> = std::result::Result<T, PanelError>;

/// Machine-readable classification attached to every client-facing error.
///
/// Serialized in `SCREAMING_SNAKE_CASE` so it matches the codes the panel
/// backend puts in its own error payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Login rejected; there is no session to refresh
    InvalidCredentials,
    /// Mid-session 401 that could not be recovered by a refresh
    TokenExpired,
    /// No response was received (status 0)
    NetworkError,
    /// 5xx from the backend
    ServerError,
    /// Any other non-success status
    RequestFailed,
    /// Response body did not match the expected shape
    DecodeError,
    /// Client was misconfigured
    ConfigError,
}

impl ErrorCode {
    /// Wire representation of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ServerError => "SERVER_ERROR",
            Self::RequestFailed => "REQUEST_FAILED",
            Self::DecodeError => "DECODE_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
