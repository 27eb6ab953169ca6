//! Panel-wide settings

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PanelSettings {
    pub panel_name: String,
    /// Number of backups kept per server before the oldest is pruned
    pub backup_retention: u32,
    #[serde(default)]
    pub alert_webhook_url: Option<String>,
    #[serde(default)]
    pub maintenance_mode: bool,
}
