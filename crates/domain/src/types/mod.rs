//! Domain types and models
//!
//! Everything here mirrors the panel backend's JSON contract (camelCase on
//! the wire, RFC 3339 timestamps).

pub mod access;
pub mod activity;
pub mod alert;
pub mod auth;
pub mod backup;
pub mod mods;
pub mod player;
pub mod server;
pub mod settings;
pub mod task;

pub use access::{NewUser, Permission, Role, RoleAssignment, User};
pub use activity::{ActivityEntry, DashboardSummary};
pub use alert::{Alert, AlertSeverity};
pub use auth::{AuthResponse, AuthSession, LoginRequest, UserProfile};
pub use backup::{Backup, BackupStatus, NewBackup};
pub use mods::{InstallMod, InstalledMod, ModSearchResult};
pub use player::{Player, PlayerAction};
pub use server::{
    CommandOutput, CommandRequest, NewServer, Server, ServerMetrics, ServerStatus, ServerUpdate,
};
pub use settings::PanelSettings;
pub use task::{NewTask, ScheduledTask, TaskAction, TaskUpdate};
