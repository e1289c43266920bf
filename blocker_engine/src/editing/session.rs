use std::collections::BTreeMap;

use glam::Vec3;
use serde::Serialize;

use crate::editing::menu::MenuId;
use crate::host::{Slot, MAX_SLOTS};

/// What the operator's next ping gesture means.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PingMode {
    #[default]
    Idle,
    AwaitingTeleportTarget { index: usize },
    AwaitingWallPoint1,
    AwaitingWallPoint2 { first: Vec3 },
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EditingSession {
    pub ping: PingMode,
    /// Last menu shown to the operator.
    pub menu: Option<MenuId>,
}

/// Result of feeding a ping into a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PingOutcome {
    Ignored,
    WallFirstCorner,
    CreateWall { first: Vec3, second: Vec3 },
    Teleport { index: usize, point: Vec3 },
}

/// One editing session per operator slot. Sessions are independent.
#[derive(Debug, Clone, Default)]
pub struct EditingSessions {
    sessions: BTreeMap<Slot, EditingSession>,
}

impl EditingSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&EditingSession> {
        self.sessions.get(&slot)
    }

    pub fn ping_mode(&self, slot: Slot) -> PingMode {
        self.get(slot).map(|session| session.ping).unwrap_or_default()
    }

    pub fn menu(&self, slot: Slot) -> Option<MenuId> {
        self.get(slot).and_then(|session| session.menu)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Slot, &EditingSession)> {
        self.sessions.iter().map(|(slot, session)| (*slot, session))
    }

    fn session_mut(&mut self, slot: Slot) -> Option<&mut EditingSession> {
        if slot >= MAX_SLOTS {
            return None;
        }
        Some(self.sessions.entry(slot).or_default())
    }

    pub fn set_menu(&mut self, slot: Slot, menu: MenuId) {
        if let Some(session) = self.session_mut(slot) {
            session.menu = Some(menu);
        }
    }

    pub fn begin_wall(&mut self, slot: Slot) -> bool {
        self.set_ping(slot, PingMode::AwaitingWallPoint1)
    }

    pub fn begin_teleport(&mut self, slot: Slot, index: usize) -> bool {
        self.set_ping(slot, PingMode::AwaitingTeleportTarget { index })
    }

    fn set_ping(&mut self, slot: Slot, mode: PingMode) -> bool {
        match self.session_mut(slot) {
            Some(session) => {
                session.ping = mode;
                true
            }
            None => false,
        }
    }

    /// Advances the ping state machine. Completing flows return to idle.
    pub fn take_ping(&mut self, slot: Slot, point: Vec3) -> PingOutcome {
        let Some(session) = self.sessions.get_mut(&slot) else {
            return PingOutcome::Ignored;
        };
        match session.ping {
            PingMode::Idle => PingOutcome::Ignored,
            PingMode::AwaitingWallPoint1 => {
                session.ping = PingMode::AwaitingWallPoint2 { first: point };
                PingOutcome::WallFirstCorner
            }
            PingMode::AwaitingWallPoint2 { first } => {
                session.ping = PingMode::Idle;
                PingOutcome::CreateWall {
                    first,
                    second: point,
                }
            }
            PingMode::AwaitingTeleportTarget { index } => {
                session.ping = PingMode::Idle;
                PingOutcome::Teleport { index, point }
            }
        }
    }

    pub fn reset(&mut self, slot: Slot) {
        self.sessions.remove(&slot);
    }

    pub fn reset_all(&mut self) {
        self.sessions.clear();
    }

    /// Follows the deletion of definition `index`: move targets pointing at it
    /// are dropped, later ones shift down, and open edit menus at or after it
    /// go stale. Every open obstacle list goes stale too, since its rows hold
    /// the old indices.
    pub fn forget_index(&mut self, index: usize) {
        for session in self.sessions.values_mut() {
            if let PingMode::AwaitingTeleportTarget { index: target } = &mut session.ping {
                if *target == index {
                    session.ping = PingMode::Idle;
                } else if *target > index {
                    *target -= 1;
                }
            }
            match session.menu {
                Some(MenuId::EditObstacle(shown)) if shown >= index => session.menu = None,
                Some(MenuId::ObstacleList) => session.menu = None,
                _ => {}
            }
        }
    }
}
