//! Players known to a server

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

/// Body for kick/ban moderation actions
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayerAction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
