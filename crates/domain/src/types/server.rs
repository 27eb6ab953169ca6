//! Game server instances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state reported by the process-control adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    Running,
    Stopped,
    Starting,
    Stopping,
    Crashed,
    #[serde(other)]
    Unknown,
}

impl ServerStatus {
    /// Whether the process is up or on its way up
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Starting)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    pub name: String,
    pub game: String,
    pub status: ServerStatus,
    #[serde(default)]
    pub host: Option<String>,
    pub port: u16,
    pub max_players: u32,
    #[serde(default)]
    pub online_players: u32,
    #[serde(default)]
    pub version: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServer {
    pub name: String,
    pub game: String,
    pub port: u16,
    pub max_players: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Partial update; unset fields are left untouched by the backend
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_players: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetrics {
    pub cpu_percent: f64,
    pub memory_mb: u64,
    pub uptime_seconds: u64,
    #[serde(default)]
    pub tick_rate: Option<f64>,
}

/// Console command relayed over RCON
#[derive(Debug, Clone, Serialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandOutput {
    #[serde(default)]
    pub output: String,
}
