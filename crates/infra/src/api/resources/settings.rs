//! Panel-wide settings

use gamepanel_domain::PanelSettings;
use tracing::{info, instrument};

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

#[derive(Clone, Copy)]
pub struct Settings<'a> {
    client: &'a ApiClient,
}

impl<'a> Settings<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn get(&self) -> Result<PanelSettings, ApiError> {
        self.client.get("/settings").await
    }

    /// Replace the settings document and return what the backend stored
    #[instrument(skip(self, settings))]
    pub async fn update(&self, settings: &PanelSettings) -> Result<PanelSettings, ApiError> {
        let stored: PanelSettings = self.client.put("/settings", settings).await?;
        info!(maintenance_mode = stored.maintenance_mode, "panel settings updated");
        Ok(stored)
    }
}
