//! Server backups

use gamepanel_domain::{Backup, NewBackup};
use serde::de::IgnoredAny;
use tracing::{info, instrument};
use urlencoding::encode;

use crate::api::client::ApiClient;
use crate::api::errors::ApiError;

#[derive(Clone, Copy)]
pub struct Backups<'a> {
    client: &'a ApiClient,
}

impl<'a> Backups<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    #[instrument(skip(self, server_id), fields(server_id = %server_id))]
    pub async fn list(&self, server_id: &str) -> Result<Vec<Backup>, ApiError> {
        self.client.get(&format!("/servers/{}/backups", encode(server_id))).await
    }

    /// Start a backup. The returned record is usually still `pending`.
    #[instrument(skip(self, server_id, note), fields(server_id = %server_id))]
    pub async fn create(&self, server_id: &str, note: Option<&str>) -> Result<Backup, ApiError> {
        let body = NewBackup { note: note.map(str::to_string) };
        let backup: Backup =
            self.client.post(&format!("/servers/{}/backups", encode(server_id)), &body).await?;
        info!(backup_id = %backup.id, "backup started");
        Ok(backup)
    }

    /// Restore the owning server from this backup. The server is stopped
    /// for the duration of the restore.
    #[instrument(skip(self, backup_id), fields(backup_id = %backup_id))]
    pub async fn restore(&self, backup_id: &str) -> Result<(), ApiError> {
        let path = format!("/backups/{}/restore", encode(backup_id));
        self.client.post::<_, IgnoredAny>(&path, &serde_json::json!({})).await?;
        Ok(())
    }

    #[instrument(skip(self, backup_id), fields(backup_id = %backup_id))]
    pub async fn delete(&self, backup_id: &str) -> Result<(), ApiError> {
        self.client.delete::<IgnoredAny>(&format!("/backups/{}", encode(backup_id))).await?;
        Ok(())
    }
}
