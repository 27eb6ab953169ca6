//! Conversions from external infrastructure errors into API errors.

use std::time::Duration;

use gamepanel_domain::PanelError;
use reqwest::Error as HttpError;

use crate::api::ApiError;

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Classify a transport failure. `timeout` is the configured request timeout,
/// reported back when reqwest gave up waiting.
pub(crate) fn transport_error(err: HttpError, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(timeout);
    }

    if err.is_builder() {
        return ApiError::Config(format!("invalid request: {err}"));
    }

    if err.is_decode() {
        return ApiError::Decode {
            status: err.status().map(|s| s.as_u16()).unwrap_or_default(),
            message: err.to_string(),
        };
    }

    ApiError::Network(format!("http request failed: {err}"))
}

impl From<HttpError> for ApiError {
    fn from(err: HttpError) -> Self {
        transport_error(err, Duration::ZERO)
    }
}

/* -------------------------------------------------------------------------- */
/* PanelError → ApiError */
/* -------------------------------------------------------------------------- */

impl From<PanelError> for ApiError {
    fn from(err: PanelError) -> Self {
        match err {
            PanelError::Config(message) | PanelError::Internal(message) => ApiError::Config(message),
            PanelError::InvalidInput(message) => {
                ApiError::Config(format!("invalid input: {message}"))
            }
        }
    }
}
