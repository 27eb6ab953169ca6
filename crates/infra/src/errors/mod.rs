//! Conversions from external error types into [`crate::api::ApiError`].

mod conversions;

pub(crate) use conversions::transport_error;
