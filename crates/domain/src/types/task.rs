//! Scheduled automation tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Start,
    Stop,
    Restart,
    Backup,
    /// Run `payload` as a console command
    Command,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: String,
    pub server_id: String,
    pub name: String,
    pub action: TaskAction,
    #[serde(default)]
    pub payload: Option<String>,
    /// Cron expression evaluated by the backend scheduler
    pub cron: String,
    pub enabled: bool,
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub server_id: String,
    pub name: String,
    pub action: TaskAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    pub cron: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_task_serializes_action_lowercase() {
        let task = NewTask {
            server_id: "srv-1".to_string(),
            name: "nightly restart".to_string(),
            action: TaskAction::Restart,
            payload: None,
            cron: "0 4 * * *".to_string(),
            enabled: true,
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["action"], "restart");
        assert_eq!(json["serverId"], "srv-1");
        assert!(json.get("payload").is_none());
    }
}
