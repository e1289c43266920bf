//! Headless host that records everything the engine asks of it. Drives the
//! prototype binary and the integration tests.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;

use crate::color::Rgb;
use crate::editing::menu::Menu;
use crate::geometry::Angles;
use crate::host::{
    Authorizer, EntityHandle, MenuPresenter, Notice, Notifier, OccupantRegistry, Recipient,
    SceneHost, Slot, SpawnError, SpawnRequest, VisualProperty, MAX_SLOTS,
};

/// First steam id handed out by [`SimHost::fill_humans`].
pub const SIM_STEAM_ID_BASE: u64 = 76_561_198_000_000_000;

#[derive(Debug, Clone, PartialEq)]
pub struct SimEntity {
    pub request: SpawnRequest,
    pub transform: Option<(Vec3, Angles)>,
    pub visuals: Vec<VisualProperty>,
}

impl SimEntity {
    /// Beam colour after every recolour applied so far.
    pub fn beam_color(&self) -> Option<Rgb> {
        let SpawnRequest::Beam { color, .. } = &self.request else {
            return None;
        };
        let recoloured = self.visuals.iter().rev().find_map(|visual| match visual {
            VisualProperty::BeamColor(color) => Some(*color),
            _ => None,
        });
        Some(recoloured.unwrap_or(*color))
    }

    pub fn scale(&self) -> Option<f32> {
        let SpawnRequest::Prop { scale, .. } = &self.request else {
            return None;
        };
        let rescaled = self.visuals.iter().rev().find_map(|visual| match visual {
            VisualProperty::Scale(scale) => Some(*scale),
            _ => None,
        });
        Some(rescaled.unwrap_or(*scale))
    }

    pub fn is_hidden(&self) -> bool {
        self.visuals
            .iter()
            .rev()
            .find_map(|visual| match visual {
                VisualProperty::NoDraw(hidden) => Some(*hidden),
                _ => None,
            })
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimOccupant {
    pub steam_id: u64,
    pub automated: bool,
    pub observer: bool,
}

#[derive(Debug, Clone)]
pub struct SimHost {
    next_handle: u64,
    entities: BTreeMap<EntityHandle, SimEntity>,
    created: usize,
    destroyed: usize,
    stray_destroys: usize,
    occupants: BTreeMap<Slot, SimOccupant>,
    permissions: BTreeMap<Slot, BTreeSet<String>>,
    flags: BTreeMap<Slot, BTreeSet<String>>,
    aim: BTreeMap<Slot, Vec3>,
    menus: Vec<(Slot, Menu)>,
    notices: Vec<(Recipient, Notice)>,
    collision_bounds: bool,
    scale_in_place: bool,
    entity_limit: Option<usize>,
}

impl Default for SimHost {
    fn default() -> Self {
        SimHost {
            next_handle: 1,
            entities: BTreeMap::new(),
            created: 0,
            destroyed: 0,
            stray_destroys: 0,
            occupants: BTreeMap::new(),
            permissions: BTreeMap::new(),
            flags: BTreeMap::new(),
            aim: BTreeMap::new(),
            menus: Vec::new(),
            notices: Vec::new(),
            collision_bounds: true,
            scale_in_place: true,
            entity_limit: None,
        }
    }
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_collision_bounds(mut self) -> Self {
        self.collision_bounds = false;
        self
    }

    pub fn set_scale_in_place(&mut self, supported: bool) {
        self.scale_in_place = supported;
    }

    /// Refuses spawns once this many entities exist.
    pub fn set_entity_limit(&mut self, limit: Option<usize>) {
        self.entity_limit = limit;
    }

    pub fn connect(&mut self, slot: Slot, steam_id: u64) {
        self.occupants.insert(
            slot,
            SimOccupant {
                steam_id,
                automated: false,
                observer: false,
            },
        );
    }

    pub fn connect_bot(&mut self, slot: Slot) {
        self.occupants.insert(
            slot,
            SimOccupant {
                steam_id: 0,
                automated: true,
                observer: false,
            },
        );
    }

    pub fn connect_observer(&mut self, slot: Slot, steam_id: u64) {
        self.occupants.insert(
            slot,
            SimOccupant {
                steam_id,
                automated: false,
                observer: true,
            },
        );
    }

    pub fn disconnect(&mut self, slot: Slot) {
        self.occupants.remove(&slot);
        self.aim.remove(&slot);
    }

    /// Connects humans in the first `count` free slots.
    pub fn fill_humans(&mut self, count: usize) {
        let free: Vec<Slot> = (0..MAX_SLOTS)
            .filter(|slot| !self.occupants.contains_key(slot))
            .take(count)
            .collect();
        for slot in free {
            self.connect(slot, SIM_STEAM_ID_BASE + slot as u64);
        }
    }

    pub fn grant_permission(&mut self, slot: Slot, permission: &str) {
        self.permissions
            .entry(slot)
            .or_default()
            .insert(permission.to_string());
    }

    pub fn grant_flag(&mut self, slot: Slot, flag: &str) {
        self.flags.entry(slot).or_default().insert(flag.to_string());
    }

    /// Where the slot's crosshair ray lands; `None` aims at the sky.
    pub fn aim(&mut self, slot: Slot, point: Option<Vec3>) {
        match point {
            Some(point) => self.aim.insert(slot, point),
            None => self.aim.remove(&slot),
        };
    }

    /// Round restart: the world drops every entity without the engine asking.
    pub fn restart_round(&mut self) {
        self.entities.clear();
    }

    pub fn entity(&self, handle: EntityHandle) -> Option<&SimEntity> {
        self.entities.get(&handle)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityHandle, &SimEntity)> {
        self.entities.iter().map(|(handle, entity)| (*handle, entity))
    }

    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    pub fn count_kind(&self, kind: &str) -> usize {
        self.entities
            .values()
            .filter(|entity| entity.request.kind_name() == kind)
            .count()
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    /// Destroy calls for handles that did not exist.
    pub fn stray_destroys(&self) -> usize {
        self.stray_destroys
    }

    pub fn menus(&self) -> &[(Slot, Menu)] {
        &self.menus
    }

    pub fn last_menu(&self, slot: Slot) -> Option<&Menu> {
        self.menus
            .iter()
            .rev()
            .find(|(shown_to, _)| *shown_to == slot)
            .map(|(_, menu)| menu)
    }

    pub fn notices(&self) -> &[(Recipient, Notice)] {
        &self.notices
    }

    pub fn clear_log(&mut self) {
        self.menus.clear();
        self.notices.clear();
    }
}

impl SceneHost for SimHost {
    fn create_solid(&mut self, request: &SpawnRequest) -> Result<EntityHandle, SpawnError> {
        if self
            .entity_limit
            .is_some_and(|limit| self.entities.len() >= limit)
        {
            return Err(SpawnError::LimitReached);
        }
        if let SpawnRequest::Prop { model_path, .. } = request {
            if model_path.trim().is_empty() {
                return Err(SpawnError::Refused("prop"));
            }
        }
        let handle = EntityHandle(self.next_handle);
        self.next_handle += 1;
        self.created += 1;
        self.entities.insert(
            handle,
            SimEntity {
                request: request.clone(),
                transform: None,
                visuals: Vec::new(),
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: EntityHandle) {
        if self.entities.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            self.stray_destroys += 1;
        }
    }

    fn set_transform(&mut self, handle: EntityHandle, position: Vec3, angles: Angles) {
        if let Some(entity) = self.entities.get_mut(&handle) {
            entity.transform = Some((position, angles));
        }
    }

    fn set_visual(&mut self, handle: EntityHandle, property: VisualProperty) -> bool {
        let scale_in_place = self.scale_in_place;
        let Some(entity) = self.entities.get_mut(&handle) else {
            return false;
        };
        let accepted = match (&entity.request, property) {
            (SpawnRequest::Prop { .. }, VisualProperty::Scale(_)) => scale_in_place,
            (SpawnRequest::Beam { .. }, VisualProperty::BeamColor(_)) => true,
            (SpawnRequest::Prop { .. }, _) => !matches!(property, VisualProperty::BeamColor(_)),
            _ => false,
        };
        if accepted {
            entity.visuals.push(property);
        }
        accepted
    }

    fn ray_cast_from_view(&self, slot: Slot) -> Option<Vec3> {
        self.aim.get(&slot).copied()
    }

    fn supports_collision_bounds(&self) -> bool {
        self.collision_bounds
    }
}

impl OccupantRegistry for SimHost {
    fn is_connected(&self, slot: Slot) -> bool {
        self.occupants.contains_key(&slot)
    }

    fn is_automated(&self, slot: Slot) -> bool {
        self.occupants
            .get(&slot)
            .is_some_and(|occupant| occupant.automated)
    }

    fn is_observer(&self, slot: Slot) -> bool {
        self.occupants
            .get(&slot)
            .is_some_and(|occupant| occupant.observer)
    }

    fn slot_for_steam_id(&self, steam_id: u64) -> Option<Slot> {
        self.occupants
            .iter()
            .find(|(_, occupant)| !occupant.automated && occupant.steam_id == steam_id)
            .map(|(slot, _)| *slot)
    }
}

impl Authorizer for SimHost {
    fn has_permission(&self, slot: Slot, permission: &str) -> bool {
        self.permissions
            .get(&slot)
            .is_some_and(|granted| granted.contains(permission))
    }

    fn has_flag(&self, slot: Slot, flag: &str) -> bool {
        self.flags
            .get(&slot)
            .is_some_and(|granted| granted.contains(flag))
    }
}

impl MenuPresenter for SimHost {
    fn show_menu(&mut self, slot: Slot, menu: Menu) {
        self.menus.push((slot, menu));
    }
}

impl Notifier for SimHost {
    fn notify(&mut self, recipient: Recipient, notice: Notice) {
        self.notices.push((recipient, notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_spawns_and_destroys() {
        let mut host = SimHost::new();
        let beam = host
            .create_solid(&SpawnRequest::Beam {
                start: Vec3::ZERO,
                end: Vec3::X,
                color: Rgb::RED,
            })
            .expect("beam spawns");
        assert!(host.set_visual(beam, VisualProperty::BeamColor(Rgb::WHITE)));
        assert!(!host.set_visual(beam, VisualProperty::Scale(2.0)));
        assert_eq!(host.entity(beam).and_then(SimEntity::beam_color), Some(Rgb::WHITE));

        host.destroy(beam);
        host.destroy(beam);
        assert_eq!(host.created(), 1);
        assert_eq!(host.destroyed(), 1);
        assert_eq!(host.stray_destroys(), 1);
    }

    #[test]
    fn entity_limit_refuses_spawns() {
        let mut host = SimHost::new();
        host.set_entity_limit(Some(0));
        let request = SpawnRequest::CollisionVolume {
            center: Vec3::ZERO,
            half_extents: Vec3::ONE,
            yaw: 0.0,
        };
        assert_eq!(host.create_solid(&request), Err(SpawnError::LimitReached));
    }

    #[test]
    fn steam_ids_resolve_to_human_slots() {
        let mut host = SimHost::new();
        host.connect_bot(0);
        host.fill_humans(2);
        assert_eq!(host.slot_for_steam_id(SIM_STEAM_ID_BASE + 1), Some(1));
        assert_eq!(host.slot_for_steam_id(0), None);
        assert!(host.is_automated(0));
    }
}
