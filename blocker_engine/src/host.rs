//! Contracts the engine consumes from the game server it runs inside.
//!
//! The engine never renders, simulates or authorises anything itself; it
//! addresses the host through these traits and owns only the handles the host
//! gives back.

use glam::Vec3;
use serde::Serialize;
use thiserror::Error;

use crate::color::Rgb;
use crate::editing::menu::Menu;
use crate::geometry::Angles;

/// Player slot on the server.
pub type Slot = usize;

pub const MAX_SLOTS: Slot = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntityHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SpawnRequest {
    /// Solid model entity.
    Prop {
        model_path: String,
        position: Vec3,
        angles: Angles,
        scale: f32,
    },
    /// Invisible solid that only blocks movement.
    CollisionVolume {
        center: Vec3,
        half_extents: Vec3,
        yaw: f32,
    },
    /// Visual-only line segment, no collision.
    Beam { start: Vec3, end: Vec3, color: Rgb },
}

impl SpawnRequest {
    pub fn kind_name(&self) -> &'static str {
        match self {
            SpawnRequest::Prop { .. } => "prop",
            SpawnRequest::CollisionVolume { .. } => "collision volume",
            SpawnRequest::Beam { .. } => "beam",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VisualProperty {
    Scale(f32),
    Alpha(u8),
    NoDraw(bool),
    Tint(Rgb),
    BeamColor(Rgb),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    #[error("model path `{0}` is not a compiled model")]
    InvalidModel(String),
    #[error("host refused to create {0}")]
    Refused(&'static str),
    #[error("entity limit reached")]
    LimitReached,
}

pub trait SceneHost {
    fn create_solid(&mut self, request: &SpawnRequest) -> Result<EntityHandle, SpawnError>;
    fn destroy(&mut self, handle: EntityHandle);
    fn set_transform(&mut self, handle: EntityHandle, position: Vec3, angles: Angles);
    /// Returns false when the entity cannot take the property in place.
    fn set_visual(&mut self, handle: EntityHandle, property: VisualProperty) -> bool;
    fn ray_cast_from_view(&self, slot: Slot) -> Option<Vec3>;
    /// Whether collision volumes can be sized. Queried once at engine start.
    fn supports_collision_bounds(&self) -> bool;
}

pub trait OccupantRegistry {
    fn is_connected(&self, slot: Slot) -> bool;
    fn is_automated(&self, slot: Slot) -> bool;
    fn is_observer(&self, slot: Slot) -> bool;
    fn slot_for_steam_id(&self, steam_id: u64) -> Option<Slot>;
}

pub trait Authorizer {
    fn has_permission(&self, slot: Slot, permission: &str) -> bool;
    fn has_flag(&self, slot: Slot, flag: &str) -> bool;
}

pub trait MenuPresenter {
    fn show_menu(&mut self, slot: Slot, menu: Menu);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Operator(Slot),
    Everyone,
}

/// Player-facing messages. Wording and translation belong to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    NoAccess,
    PassageClosed { min_players: usize },
    PingFirstCorner,
    PingSecondCorner,
    PingMoveTarget,
    WallCreated { index: usize },
    Saved { count: usize },
    NoCrosshairTarget,
}

pub trait Notifier {
    fn notify(&mut self, recipient: Recipient, notice: Notice);
}

pub trait Host: SceneHost + OccupantRegistry + Authorizer + MenuPresenter + Notifier {}

impl<T> Host for T where T: SceneHost + OccupantRegistry + Authorizer + MenuPresenter + Notifier {}
