//! API-specific error types
//!
//! Every failure surfaced to consumers exposes a human-readable message, the
//! HTTP status (`0` when no response arrived) and a machine-readable
//! [`ErrorCode`].

use std::time::Duration;

use gamepanel_domain::constants::{GENERIC_ERROR_MESSAGE, MAX_ERROR_BODY_LENGTH};
use gamepanel_domain::ErrorCode;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Credentials rejected or session gone - needs a new login
    Authentication,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Unexpected response shape - non-retryable
    Decode,
    /// Configuration errors - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// Login rejected (no session existed, so nothing was refreshed)
    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    /// Mid-session 401 that a refresh could not recover
    #[error("Session expired: {0}")]
    SessionExpired(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String, payload: Option<Value> },

    #[error("Client error ({status}): {message}")]
    Client { status: u16, message: String, payload: Option<Value> },

    #[error("Failed to decode response ({status}): {message}")]
    Decode { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// The body is parsed as JSON on a best-effort basis; the message comes
    /// from its `message` (or `error`) field, falling back to a generic text.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let payload = serde_json::from_slice::<Value>(body).ok();
        let message = payload
            .as_ref()
            .and_then(|p| p.get("message").or_else(|| p.get("error")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!("{} with status {}", GENERIC_ERROR_MESSAGE, status.as_u16())
            });

        if status.is_server_error() {
            Self::Server { status: status.as_u16(), message, payload }
        } else {
            Self::Client { status: status.as_u16(), message, payload }
        }
    }

    /// HTTP status of the failed call, `0` when there was no response
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidCredentials { .. } | Self::SessionExpired(_) => {
                StatusCode::UNAUTHORIZED.as_u16()
            }
            Self::Server { status, .. } | Self::Client { status, .. } | Self::Decode { status, .. } => {
                *status
            }
            Self::Network(_) | Self::Timeout(_) | Self::Config(_) => 0,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidCredentials { .. } => ErrorCode::InvalidCredentials,
            Self::SessionExpired(_) => ErrorCode::TokenExpired,
            Self::Network(_) | Self::Timeout(_) => ErrorCode::NetworkError,
            Self::Server { .. } => ErrorCode::ServerError,
            Self::Client { .. } => ErrorCode::RequestFailed,
            Self::Decode { .. } => ErrorCode::DecodeError,
            Self::Config(_) => ErrorCode::ConfigError,
        }
    }

    /// Human-readable message without the variant prefix
    pub fn message(&self) -> String {
        match self {
            Self::InvalidCredentials { message }
            | Self::Server { message, .. }
            | Self::Client { message, .. }
            | Self::Decode { message, .. } => message.clone(),
            Self::SessionExpired(message) | Self::Network(message) | Self::Config(message) => {
                message.clone()
            }
            Self::Timeout(timeout) => format!("no response within {timeout:?}"),
        }
    }

    /// Parsed JSON error body, when the server sent one
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Server { payload, .. } | Self::Client { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    /// Get the error category for this error
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::InvalidCredentials { .. } | Self::SessionExpired(_) => {
                ApiErrorCategory::Authentication
            }
            Self::Server { .. } => ApiErrorCategory::Server,
            Self::Client { .. } => ApiErrorCategory::Client,
            Self::Network(_) | Self::Timeout(_) => ApiErrorCategory::Network,
            Self::Decode { .. } => ApiErrorCategory::Decode,
            Self::Config(_) => ApiErrorCategory::Config,
        }
    }

    /// Whether a consumer may reasonably try the same call again later
    pub fn should_retry(&self) -> bool {
        matches!(self.category(), ApiErrorCategory::Server | ApiErrorCategory::Network)
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }
}

/// Printable excerpt of a response body for logs
pub(crate) fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    if text.len() <= MAX_ERROR_BODY_LENGTH {
        return text.into_owned();
    }

    let mut cut = MAX_ERROR_BODY_LENGTH;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &text[..cut], body.len())
}
