//! Game server lifecycle and console access

use gamepanel_domain::{
    CommandOutput, CommandRequest, NewServer, Server, ServerMetrics, ServerUpdate,
};
use serde::de::IgnoredAny;
use tracing::{debug, instrument};
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

/// Operations on `/servers`
#[derive(Clone, Copy)]
pub struct Servers<'a> {
    client: &'a ApiClient,
}

impl<'a> Servers<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// List every server visible to the signed-in user
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Server>, ApiError> {
        self.client.get("/servers").await
    }

    /// Get a single server by ID
    ///
    /// # Errors
    ///
    /// Returns error if the server does not exist or the API request fails
    #[instrument(skip(self, id), fields(server_id = %id))]
    pub async fn get(&self, id: &str) -> Result<Server, ApiError> {
        self.client.get(&format!("/servers/{}", encode(id))).await
    }

    /// Provision a new server
    ///
    /// # Errors
    ///
    /// Returns error if the request is rejected (e.g. port in use)
    #[instrument(skip(self, server), fields(name = %server.name, game = %server.game))]
    pub async fn create(&self, server: &NewServer) -> Result<Server, ApiError> {
        let created: Server = self.client.post("/servers", server).await?;
        debug!(server_id = %created.id, "server created");
        Ok(created)
    }

    /// Apply a partial update; unset fields are left untouched
    #[instrument(skip(self, id, update), fields(server_id = %id))]
    pub async fn update(&self, id: &str, update: &ServerUpdate) -> Result<Server, ApiError> {
        self.client.patch(&format!("/servers/{}", encode(id)), update).await
    }

    #[instrument(skip(self, id), fields(server_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/servers/{}", encode(id))).await?;
        Ok(())
    }

    pub async fn start(&self, id: &str) -> Result<(), ApiError> {
        self.power(id, "start").await
    }

    pub async fn stop(&self, id: &str) -> Result<(), ApiError> {
        self.power(id, "stop").await
    }

    pub async fn restart(&self, id: &str) -> Result<(), ApiError> {
        self.power(id, "restart").await
    }

    /// Run a console command and return its captured output
    #[instrument(skip(self, id, command), fields(server_id = %id))]
    pub async fn send_command(&self, id: &str, command: &str) -> Result<CommandOutput, ApiError> {
        let body = CommandRequest { command: command.to_string() };
        self.client.post(&format!("/servers/{}/command", encode(id)), &body).await
    }

    /// Current resource usage
    #[instrument(skip(self, id), fields(server_id = %id))]
    pub async fn metrics(&self, id: &str) -> Result<ServerMetrics, ApiError> {
        self.client.get(&format!("/servers/{}/metrics", encode(id))).await
    }

    #[instrument(skip(self, id), fields(server_id = %id))]
    async fn power(&self, id: &str, action: &str) -> Result<(), ApiError> {
        let path = format!("/servers/{}/{}", encode(id), action);
        self.client.post::<_, IgnoredAny>(&path, &serde_json::json!({})).await?;
        debug!("power action accepted");
        Ok(())
    }
}
