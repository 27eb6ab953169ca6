//! Per-call request options

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::ApiError;

/// Method, body, headers and query for a single [`super::ApiClient::request`]
/// call. Defaults to a bare `GET`.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, body: None, headers: HeaderMap::new(), query: Vec::new() }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if `body` cannot be represented as JSON.
    pub fn json<B>(mut self, body: &B) -> Result<Self, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let value = serde_json::to_value(body)
            .map_err(|err| ApiError::Config(format!("failed to encode request body: {err}")))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}
