//! Scheduled automation tasks

use gamepanel_domain::{NewTask, ScheduledTask, TaskUpdate};
use serde::de::IgnoredAny;
use tracing::{debug, instrument};
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

#[derive(Clone, Copy)]
pub struct Tasks<'a> {
    client: &'a ApiClient,
}

impl<'a> Tasks<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ScheduledTask>, ApiError> {
        self.client.get("/tasks").await
    }

    #[instrument(skip(self, task), fields(server_id = %task.server_id, cron = %task.cron))]
    pub async fn create(&self, task: &NewTask) -> Result<ScheduledTask, ApiError> {
        let created: ScheduledTask = self.client.post("/tasks", task).await?;
        debug!(task_id = %created.id, next_run = ?created.next_run, "task scheduled");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    pub async fn update(&self, id: &str, update: &TaskUpdate) -> Result<ScheduledTask, ApiError> {
        self.client.patch(&format!("/tasks/{}", encode(id)), update).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/tasks/{}", encode(id))).await?;
        Ok(())
    }

    /// Trigger a task immediately, outside its schedule
    #[instrument(skip(self))]
    pub async fn run_now(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/tasks/{}/run", encode(id));
        self.client.post::<_, IgnoredAny>(&path, &serde_json::json!({})).await?;
        Ok(())
    }
}
