use glam::Vec3;
use log::{debug, info};

use crate::editing::actions::{edit_definition, relocate, Change, EditAction};
use crate::editing::menu::{
    edit_menu, list_menu, main_menu, model_menu, Menu, MenuId, MAIN_EDIT, MAIN_PLACE, MAIN_WALL,
};
use crate::editing::session::{PingMode, PingOutcome};
use crate::engine::Engine;
use crate::host::{Host, Notice, Recipient, Slot};
use crate::obstacle::Obstacle;

/// Crosshair radius for jumping straight into an obstacle's edit menu.
pub const PICK_RADIUS: f32 = 128.0;

impl<H: Host> Engine<H> {
    /// Operator chat command: opens the main menu.
    pub fn on_command(&mut self, slot: Slot) {
        if !self.is_authorized(slot) {
            self.deny(slot);
            return;
        }
        self.open_main(slot);
    }

    /// A selection from a menu previously shown to `slot`. Picks from a menu
    /// other than the last one shown are dropped.
    pub fn on_menu_select(&mut self, slot: Slot, menu: MenuId, key: &str) {
        if !self.is_authorized(slot) {
            self.deny(slot);
            return;
        }
        if self.sessions.menu(slot) != Some(menu) {
            debug!("slot {slot} picked `{key}` from stale menu {menu:?}");
            return;
        }
        match menu {
            MenuId::Main => match key {
                MAIN_PLACE => self.open_models(slot),
                MAIN_WALL => {
                    if self.sessions.begin_wall(slot) {
                        self.notify(slot, Notice::PingFirstCorner);
                    }
                }
                MAIN_EDIT => self.open_edit_shortcut(slot),
                _ => {}
            },
            MenuId::ModelPicker => {
                if key == "back" {
                    self.open_main(slot);
                } else if let Some(model) = indexed(key, "m:") {
                    self.place_prop(slot, model);
                }
            }
            MenuId::ObstacleList => {
                if key == "back" {
                    self.open_main(slot);
                } else if let Some(index) = indexed(key, "e:") {
                    self.select_obstacle(slot, index);
                }
            }
            MenuId::EditObstacle(index) => match key.parse::<EditAction>() {
                Ok(action) => self.apply_edit(slot, index, action),
                Err(err) => debug!("slot {slot}: {err}"),
            },
        }
    }

    /// Ping gesture at `point`. Ignored unless the operator is mid-flow.
    pub fn on_ping(&mut self, slot: Slot, point: Vec3) {
        if !point.is_finite() || self.sessions.ping_mode(slot) == PingMode::Idle {
            return;
        }
        if !self.is_authorized(slot) {
            self.sessions.reset(slot);
            self.deny(slot);
            return;
        }
        match self.sessions.take_ping(slot, point) {
            PingOutcome::Ignored => {}
            PingOutcome::WallFirstCorner => self.notify(slot, Notice::PingSecondCorner),
            PingOutcome::CreateWall { first, second } => self.create_wall(slot, first, second),
            PingOutcome::Teleport { index, point } => {
                if self.store.get(index).is_some() {
                    self.relocate_obstacle(index, point);
                    self.open_edit(slot, index);
                }
            }
        }
    }

    /// Removes a definition, its live instance and every reference to its
    /// index, then saves.
    pub fn delete_obstacle(&mut self, index: usize) -> bool {
        if index >= self.store.len() {
            return false;
        }
        self.registry.remove_definition(index, &mut self.host);
        let removed = self.store.remove(index);
        self.sessions.forget_index(index);
        self.persist();
        if let Some(obstacle) = removed {
            info!("deleted obstacle {index} ({})", obstacle.display_name());
        }
        true
    }

    fn deny(&mut self, slot: Slot) {
        self.notify(slot, Notice::NoAccess);
    }

    fn notify(&mut self, slot: Slot, notice: Notice) {
        self.host.notify(Recipient::Operator(slot), notice);
    }

    fn show(&mut self, slot: Slot, menu: Menu) {
        self.sessions.set_menu(slot, menu.id);
        self.host.show_menu(slot, menu);
    }

    fn open_main(&mut self, slot: Slot) {
        let menu = main_menu(self.store.zone(), self.store.len());
        self.show(slot, menu);
    }

    fn open_models(&mut self, slot: Slot) {
        let menu = model_menu(self.catalog.iter().map(|entry| entry.label.as_str()));
        self.show(slot, menu);
    }

    fn open_list(&mut self, slot: Slot) {
        let menu = list_menu(self.store.iter());
        self.show(slot, menu);
    }

    fn open_edit(&mut self, slot: Slot, index: usize) {
        match self.store.get(index) {
            Some(obstacle) => {
                let menu = edit_menu(index, obstacle);
                self.show(slot, menu);
            }
            None => self.open_list(slot),
        }
    }

    fn open_edit_shortcut(&mut self, slot: Slot) {
        let near = self
            .crosshair_point(slot)
            .and_then(|point| self.registry.find_near(point, PICK_RADIUS, &self.store));
        match near {
            Some(index) => self.open_edit(slot, index),
            None => self.open_list(slot),
        }
    }

    fn crosshair_point(&self, slot: Slot) -> Option<Vec3> {
        self.host
            .ray_cast_from_view(slot)
            .filter(|point| point.is_finite())
    }

    fn make_live(&mut self, index: usize) {
        let open = self.is_open();
        self.registry.make_live_if_missing(
            index,
            open,
            &self.store,
            &mut self.host,
            self.rainbow.hue(),
        );
        self.arm_rainbow_if_needed();
    }

    fn place_prop(&mut self, slot: Slot, model: usize) {
        let Some(entry) = self.catalog.get(model).cloned() else {
            return;
        };
        let Some(point) = self.crosshair_point(slot) else {
            self.notify(slot, Notice::NoCrosshairTarget);
            return;
        };
        let index = self
            .store
            .append(Obstacle::prop(entry.label, entry.path, point));
        self.persist();
        self.make_live(index);
        info!("slot {slot} placed obstacle {index}");
        self.open_main(slot);
    }

    fn create_wall(&mut self, slot: Slot, first: Vec3, second: Vec3) {
        let number = self.store.iter().filter(|obstacle| obstacle.is_wall()).count() + 1;
        let index = self
            .store
            .append(Obstacle::wall(format!("Wall {number}"), first, second));
        self.persist();
        self.make_live(index);
        info!("slot {slot} created wall {index}");
        self.notify(slot, Notice::WallCreated { index });
        self.open_edit(slot, index);
    }

    fn select_obstacle(&mut self, slot: Slot, index: usize) {
        if index >= self.store.len() {
            return;
        }
        self.make_live(index);
        self.open_edit(slot, index);
    }

    fn apply_edit(&mut self, slot: Slot, index: usize, action: EditAction) {
        if index >= self.store.len() {
            return;
        }
        match action {
            EditAction::Back => self.open_list(slot),
            EditAction::Save => {
                if self.persist() {
                    let count = self.store.len();
                    self.notify(slot, Notice::Saved { count });
                }
                self.open_edit(slot, index);
            }
            EditAction::Delete => {
                self.delete_obstacle(index);
                self.open_list(slot);
            }
            EditAction::MoveToPing => {
                if self.sessions.begin_teleport(slot, index) {
                    self.notify(slot, Notice::PingMoveTarget);
                }
            }
            EditAction::MoveToCrosshair => {
                match self.crosshair_point(slot) {
                    Some(point) => self.relocate_obstacle(index, point),
                    None => self.notify(slot, Notice::NoCrosshairTarget),
                }
                self.open_edit(slot, index);
            }
            action => {
                let change = self
                    .store
                    .mutate(index, |obstacle| edit_definition(obstacle, &action))
                    .flatten();
                if let Some(change) = change {
                    self.follow_change(index, change);
                    self.persist();
                }
                self.open_edit(slot, index);
            }
        }
    }

    fn relocate_obstacle(&mut self, index: usize, point: Vec3) {
        if let Some(change) = self
            .store
            .mutate(index, |obstacle| relocate(obstacle, point))
        {
            self.follow_change(index, change);
            self.persist();
        }
    }

    /// Brings the live instance in line with an edited definition, in place
    /// where the host allows it.
    fn follow_change(&mut self, index: usize, change: Change) {
        let open = self.is_open();
        let hue = self.rainbow.hue();
        match change {
            Change::Transform => {
                let Some(prop) = self.store.get(index).and_then(Obstacle::as_prop) else {
                    return;
                };
                let moved = self
                    .registry
                    .teleport(index, prop.position, prop.angles, &mut self.host);
                if !moved {
                    self.make_live(index);
                }
            }
            Change::Scale(_) => {
                self.registry
                    .apply_scale(index, open, &self.store, &mut self.host, hue);
            }
            Change::Visibility(visible) => {
                self.registry
                    .apply_visibility(index, visible, &mut self.host);
            }
            Change::Tint(tint) => self.registry.apply_tint(index, tint, &mut self.host),
            Change::WireColor(color) => {
                let rainbow = self
                    .store
                    .get(index)
                    .and_then(Obstacle::as_wall)
                    .is_some_and(|wall| wall.rainbow);
                if !rainbow {
                    self.registry
                        .recolor_wireframe(index, color, &mut self.host);
                }
            }
            Change::Rainbow(true) => self.arm_rainbow_if_needed(),
            Change::Rainbow(false) => {
                let color = self.store.get(index).and_then(Obstacle::as_wall).map(|wall| wall.color);
                if let Some(color) = color {
                    self.registry
                        .recolor_wireframe(index, color, &mut self.host);
                }
            }
            Change::Geometry => {
                self.registry
                    .respawn(index, open, &self.store, &mut self.host, hue);
                self.arm_rainbow_if_needed();
            }
        }
    }
}

fn indexed(key: &str, prefix: &str) -> Option<usize> {
    key.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::indexed;

    #[test]
    fn indexed_keys() {
        assert_eq!(indexed("m:3", "m:"), Some(3));
        assert_eq!(indexed("e:-1", "e:"), None);
        assert_eq!(indexed("e:x", "e:"), None);
        assert_eq!(indexed("m:1", "e:"), None);
    }
}
