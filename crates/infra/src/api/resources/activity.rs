//! Audit trail and dashboard

use gamepanel_domain::{ActivityEntry, DashboardSummary};
use tracing::instrument;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::request::RequestOptions;

#[derive(Clone, Copy)]
pub struct Activity<'a> {
    client: &'a ApiClient,
}

impl<'a> Activity<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Most recent audit entries, newest first
    #[instrument(skip(self))]
    pub async fn recent(&self, limit: u32) -> Result<Vec<ActivityEntry>, ApiError> {
        self.client.request("/activity", RequestOptions::get().query("limit", limit)).await
    }
}

#[derive(Clone, Copy)]
pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ApiError> {
        self.client.get("/dashboard/summary").await
    }
}
