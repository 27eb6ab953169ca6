//! Typed wrappers over [`ApiClient::request`] for each panel resource
//!
//! Each accessor borrows the client, so every call shares its session and
//! participates in the same refresh coordination.

mod access;
mod activity;
mod alerts;
mod backups;
mod mods;
mod players;
mod servers;
mod settings;
mod tasks;

pub use access::{Permissions, Users};
pub use activity::{Activity, Dashboard};
pub use alerts::Alerts;
pub use backups::Backups;
pub use mods::Mods;
pub use players::Players;
pub use servers::Servers;
pub use settings::Settings;
pub use tasks::Tasks;

use super::client::ApiClient;

impl ApiClient {
    pub fn servers(&self) -> Servers<'_> {
        Servers::new(self)
    }

    pub fn backups(&self) -> Backups<'_> {
        Backups::new(self)
    }

    pub fn players(&self) -> Players<'_> {
        Players::new(self)
    }

    pub fn mods(&self) -> Mods<'_> {
        Mods::new(self)
    }

    pub fn tasks(&self) -> Tasks<'_> {
        Tasks::new(self)
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(self)
    }

    pub fn permissions(&self) -> Permissions<'_> {
        Permissions::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn activity(&self) -> Activity<'_> {
        Activity::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings::new(self)
    }
}
