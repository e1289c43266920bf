//! Presence-gated obstacles for a multiplayer game server.
//!
//! Below a population threshold, operator-placed props and walls are kept
//! materialised in the world; once enough occupants are connected, every
//! obstacle is removed. The [`Engine`] owns the per-zone state and drives the
//! host through the traits in [`host`].

pub mod access;
pub mod color;
pub mod console;
pub mod editing;
pub mod engine;
pub mod gate;
pub mod geometry;
pub mod host;
pub mod logging;
pub mod obstacle;
pub mod rainbow;
pub mod registry;
pub mod scheduler;
pub mod sim;
pub mod store;

pub use engine::{Engine, StateSnapshot};
pub use host::Host;
pub use obstacle::{Obstacle, ObstacleKind};
pub use store::{JsonFileBackend, MemoryBackend, ObstacleStore, SectionBackend};
