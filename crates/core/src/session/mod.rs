//! Session lifecycle: refresh coordination, local state and listener ports.

pub mod ports;
pub mod refresh;
pub mod state;
