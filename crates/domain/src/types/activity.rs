//! Audit trail and dashboard aggregates

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    #[serde(default)]
    pub actor: Option<String>,
    pub action: String,
    #[serde(default)]
    pub target: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    pub total_servers: u32,
    pub running_servers: u32,
    pub online_players: u32,
    pub active_alerts: u32,
    pub recent_backups: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_summary_tolerates_missing_counters() {
        let summary: DashboardSummary =
            serde_json::from_str(r#"{ "totalServers": 4, "runningServers": 2 }"#).unwrap();
        assert_eq!(summary.total_servers, 4);
        assert_eq!(summary.active_alerts, 0);
    }
}
