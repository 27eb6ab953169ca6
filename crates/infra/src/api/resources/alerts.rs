//! Operational alerts

use gamepanel_domain::Alert;
use serde::de::IgnoredAny;
use tracing::instrument;
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::request::RequestOptions;

#[derive(Clone, Copy)]
pub struct Alerts<'a> {
    client: &'a ApiClient,
}

impl<'a> Alerts<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List alerts, newest first. With `unacknowledged_only` the backend
    /// filters out alerts someone has already acknowledged.
    #[instrument(skip(self))]
    pub async fn list(&self, unacknowledged_only: bool) -> Result<Vec<Alert>, ApiError> {
        let mut options = RequestOptions::get();
        if unacknowledged_only {
            options = options.query("unacknowledged", true);
        }
        self.client.request("/alerts", options).await
    }

    #[instrument(skip(self))]
    pub async fn acknowledge(&self, id: &str) -> Result<Alert, ApiError> {
        let path = format!("/alerts/{}/acknowledge", encode(id));
        self.client.post(&path, &serde_json::json!({})).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/alerts/{}", encode(id))).await?;
        Ok(())
    }
}
