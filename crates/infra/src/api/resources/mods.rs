//! Mod installation and marketplace search

use gamepanel_domain::{InstallMod, InstalledMod, ModSearchResult};
use serde::de::IgnoredAny;
use tracing::{info, instrument};
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;
use crate::api::request::RequestOptions;

#[derive(Clone, Copy)]
pub struct Mods<'a> {
    client: &'a ApiClient,
}

impl<'a> Mods<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn list(&self, server_id: &str) -> Result<Vec<InstalledMod>, ApiError> {
        self.client.get(&format!("/servers/{}/mods", encode(server_id))).await
    }

    /// Search the upstream marketplace
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<ModSearchResult>, ApiError> {
        self.client.request("/mods/search", RequestOptions::get().query("q", query)).await
    }

    /// Install `mod_id` (latest version unless `version` is given)
    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn install(
        &self,
        server_id: &str,
        mod_id: &str,
        version: Option<&str>,
    ) -> Result<InstalledMod, ApiError> {
        let body = InstallMod { mod_id: mod_id.to_string(), version: version.map(str::to_string) };
        let installed: InstalledMod =
            self.client.post(&format!("/servers/{}/mods", encode(server_id)), &body).await?;
        info!(version = %installed.version, "mod installed");
        Ok(installed)
    }

    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn uninstall(&self, server_id: &str, mod_id: &str) -> Result<(), ApiError> {
        let path = format!("/servers/{}/mods/{}", encode(server_id), encode(mod_id));
        self.client.delete::<IgnoredAny>(&path).await?;
        Ok(())
    }
}
