//! World/data backups of a server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub id: String,
    pub server_id: String,
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub status: BackupStatus,
    #[serde(default)]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NewBackup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_status_is_snake_case() {
        let status: BackupStatus = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(status, BackupStatus::InProgress);
    }
}
