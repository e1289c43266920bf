//! Operator-facing editing: menus, per-operator ping sessions, edit tokens
//! and the protocol that ties them to the engine.

pub mod actions;
pub mod menu;
mod protocol;
pub mod session;

pub use actions::{Change, EditAction};
pub use menu::{Menu, MenuId, MenuItem};
pub use protocol::PICK_RADIUS;
pub use session::{EditingSessions, PingMode, PingOutcome};
