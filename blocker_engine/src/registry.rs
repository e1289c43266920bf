use glam::Vec3;
use log::{debug, warn};

use crate::color::Rgb;
use crate::geometry::{derive_box, generate_wireframe, Angles, WirePaint};
use crate::host::{EntityHandle, SceneHost, SpawnError, SpawnRequest, VisualProperty};
use crate::obstacle::{clamp_scale, Obstacle, ObstacleKind, Prop, Wall};
use crate::store::ObstacleStore;

/// Compiled model suffix every prop path must carry.
pub const MODEL_SUFFIX: &str = ".vmdl";

/// Host entity owned by exactly one live instance. Releasing clears the
/// handle, so a second release is a no-op.
#[derive(Debug)]
pub struct OwnedEntity {
    handle: Option<EntityHandle>,
}

impl OwnedEntity {
    pub fn new(handle: EntityHandle) -> Self {
        OwnedEntity {
            handle: Some(handle),
        }
    }

    pub fn handle(&self) -> Option<EntityHandle> {
        self.handle
    }

    pub fn release<S: SceneHost + ?Sized>(&mut self, scene: &mut S) {
        if let Some(handle) = self.handle.take() {
            scene.destroy(handle);
        }
    }

    /// Drops the handle without destroying; the host already reclaimed it.
    pub fn forget(&mut self) {
        self.handle = None;
    }
}

impl Drop for OwnedEntity {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            warn!("entity {} dropped without being released", handle.0);
        }
    }
}

#[derive(Debug)]
pub enum LiveBody {
    Prop {
        entity: OwnedEntity,
    },
    Wall {
        volumes: Vec<OwnedEntity>,
        wireframe: Vec<OwnedEntity>,
    },
}

#[derive(Debug)]
pub struct LiveInstance {
    definition_index: usize,
    body: LiveBody,
}

impl LiveInstance {
    pub fn definition_index(&self) -> usize {
        self.definition_index
    }

    pub fn body(&self) -> &LiveBody {
        &self.body
    }

    /// The prop entity, or a wall's first collision volume.
    pub fn primary_handle(&self) -> Option<EntityHandle> {
        match &self.body {
            LiveBody::Prop { entity } => entity.handle(),
            LiveBody::Wall { volumes, .. } => volumes.first().and_then(OwnedEntity::handle),
        }
    }

    pub fn collision_handles(&self) -> Vec<EntityHandle> {
        match &self.body {
            LiveBody::Prop { .. } => Vec::new(),
            LiveBody::Wall { volumes, .. } => volumes.iter().filter_map(OwnedEntity::handle).collect(),
        }
    }

    pub fn wireframe_handles(&self) -> Vec<EntityHandle> {
        match &self.body {
            LiveBody::Prop { .. } => Vec::new(),
            LiveBody::Wall { wireframe, .. } => {
                wireframe.iter().filter_map(OwnedEntity::handle).collect()
            }
        }
    }

    fn prop_handle(&self) -> Option<EntityHandle> {
        match &self.body {
            LiveBody::Prop { entity } => entity.handle(),
            LiveBody::Wall { .. } => None,
        }
    }

    fn release<S: SceneHost + ?Sized>(&mut self, scene: &mut S) {
        match &mut self.body {
            LiveBody::Prop { entity } => entity.release(scene),
            LiveBody::Wall { volumes, wireframe } => {
                volumes.iter_mut().for_each(|entity| entity.release(scene));
                wireframe.iter_mut().for_each(|entity| entity.release(scene));
            }
        }
    }

    fn forget(&mut self) {
        match &mut self.body {
            LiveBody::Prop { entity } => entity.forget(),
            LiveBody::Wall { volumes, wireframe } => {
                volumes.iter_mut().for_each(OwnedEntity::forget);
                wireframe.iter_mut().for_each(OwnedEntity::forget);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileReport {
    pub spawned: usize,
    pub destroyed: usize,
    pub failed: usize,
}

/// Tracks which definitions are materialised and owns every host entity
/// spawned for them.
#[derive(Debug)]
pub struct LiveRegistry {
    instances: Vec<LiveInstance>,
    collision_bounds: bool,
}

impl LiveRegistry {
    pub fn new(collision_bounds: bool) -> Self {
        LiveRegistry {
            instances: Vec::new(),
            collision_bounds,
        }
    }

    pub fn collision_bounds(&self) -> bool {
        self.collision_bounds
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LiveInstance> {
        self.instances.iter()
    }

    pub fn get(&self, index: usize) -> Option<&LiveInstance> {
        self.instances
            .iter()
            .find(|instance| instance.definition_index == index)
    }

    pub fn is_live(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Open: everything goes. Closed: every absent definition is materialised;
    /// live ones are left alone.
    pub fn reconcile<S: SceneHost + ?Sized>(
        &mut self,
        open: bool,
        store: &ObstacleStore,
        scene: &mut S,
        hue: f32,
    ) -> ReconcileReport {
        if open {
            return ReconcileReport {
                destroyed: self.clear(scene),
                ..ReconcileReport::default()
            };
        }

        let mut report = ReconcileReport::default();
        for (index, obstacle) in store.iter().enumerate() {
            if self.is_live(index) {
                continue;
            }
            if self.spawn_instance(index, obstacle, scene, hue) {
                report.spawned += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    /// Destroys every live instance.
    pub fn clear<S: SceneHost + ?Sized>(&mut self, scene: &mut S) -> usize {
        let count = self.instances.len();
        for mut instance in self.instances.drain(..) {
            instance.release(scene);
        }
        count
    }

    /// Drops every record without touching the host, for when the host has
    /// already removed the entities (round restart).
    pub fn forget_all(&mut self) {
        for instance in &mut self.instances {
            instance.forget();
        }
        self.instances.clear();
    }

    pub fn make_live_if_missing<S: SceneHost + ?Sized>(
        &mut self,
        index: usize,
        open: bool,
        store: &ObstacleStore,
        scene: &mut S,
        hue: f32,
    ) -> bool {
        if self.is_live(index) {
            return true;
        }
        if open {
            return false;
        }
        match store.get(index) {
            Some(obstacle) => self.spawn_instance(index, obstacle, scene, hue),
            None => false,
        }
    }

    /// Destroys and, unless the passage is open, re-materialises one
    /// definition.
    pub fn respawn<S: SceneHost + ?Sized>(
        &mut self,
        index: usize,
        open: bool,
        store: &ObstacleStore,
        scene: &mut S,
        hue: f32,
    ) -> bool {
        self.destroy(index, scene);
        if open {
            return false;
        }
        match store.get(index) {
            Some(obstacle) => self.spawn_instance(index, obstacle, scene, hue),
            None => false,
        }
    }

    /// Destroys the instance for `index` if there is one.
    pub fn destroy<S: SceneHost + ?Sized>(&mut self, index: usize, scene: &mut S) -> bool {
        match self
            .instances
            .iter()
            .position(|instance| instance.definition_index == index)
        {
            Some(position) => {
                let mut instance = self.instances.remove(position);
                instance.release(scene);
                true
            }
            None => false,
        }
    }

    /// Destroys the instance of a deleted definition and shifts every later
    /// back-reference down by one.
    pub fn remove_definition<S: SceneHost + ?Sized>(&mut self, index: usize, scene: &mut S) {
        self.destroy(index, scene);
        for instance in &mut self.instances {
            if instance.definition_index > index {
                instance.definition_index -= 1;
            }
        }
    }

    /// Moves or rotates a live prop. Returns false when nothing is live.
    pub fn teleport<S: SceneHost + ?Sized>(
        &self,
        index: usize,
        position: Vec3,
        angles: Angles,
        scene: &mut S,
    ) -> bool {
        match self.get(index).and_then(LiveInstance::prop_handle) {
            Some(handle) => {
                scene.set_transform(handle, position, angles);
                true
            }
            None => false,
        }
    }

    /// Scales a live prop in place, respawning it when the host cannot.
    pub fn apply_scale<S: SceneHost + ?Sized>(
        &mut self,
        index: usize,
        open: bool,
        store: &ObstacleStore,
        scene: &mut S,
        hue: f32,
    ) {
        let Some(handle) = self.get(index).and_then(LiveInstance::prop_handle) else {
            return;
        };
        let Some(prop) = store.get(index).and_then(Obstacle::as_prop) else {
            return;
        };
        let scale = clamp_scale(prop.scale);
        if scene.set_visual(handle, VisualProperty::Scale(scale)) {
            debug!("scaled obstacle {index} in place to {scale:.2}");
        } else {
            debug!("obstacle {index} cannot scale in place, respawning");
            self.respawn(index, open, store, scene, hue);
        }
    }

    pub fn apply_visibility<S: SceneHost + ?Sized>(&self, index: usize, visible: bool, scene: &mut S) {
        if let Some(handle) = self.get(index).and_then(LiveInstance::prop_handle) {
            set_visibility(scene, handle, visible);
        }
    }

    pub fn apply_tint<S: SceneHost + ?Sized>(&self, index: usize, tint: Rgb, scene: &mut S) {
        if let Some(handle) = self.get(index).and_then(LiveInstance::prop_handle) {
            scene.set_visual(handle, VisualProperty::Tint(tint));
        }
    }

    pub fn recolor_wireframe<S: SceneHost + ?Sized>(&self, index: usize, color: Rgb, scene: &mut S) {
        if let Some(instance) = self.get(index) {
            for handle in instance.wireframe_handles() {
                scene.set_visual(handle, VisualProperty::BeamColor(color));
            }
        }
    }

    /// Live walls whose wireframe cycles through the hue wheel.
    pub fn rainbow_walls<'a>(&'a self, store: &'a ObstacleStore) -> impl Iterator<Item = &'a LiveInstance> + 'a {
        self.instances.iter().filter(move |instance| {
            store
                .get(instance.definition_index)
                .and_then(Obstacle::as_wall)
                .is_some_and(|wall| wall.rainbow)
        })
    }

    /// Nearest live obstacle whose anchor lies within `max_distance`.
    pub fn find_near(&self, point: Vec3, max_distance: f32, store: &ObstacleStore) -> Option<usize> {
        let limit = max_distance * max_distance;
        self.instances
            .iter()
            .filter_map(|instance| {
                let obstacle = store.get(instance.definition_index)?;
                let distance = obstacle.anchor().distance_squared(point);
                (distance <= limit).then_some((instance.definition_index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    fn spawn_instance<S: SceneHost + ?Sized>(
        &mut self,
        index: usize,
        obstacle: &Obstacle,
        scene: &mut S,
        hue: f32,
    ) -> bool {
        let spawned = match &obstacle.kind {
            ObstacleKind::Prop(prop) => {
                spawn_prop(prop, scene).map(|entity| LiveBody::Prop { entity })
            }
            ObstacleKind::Wall(wall) => self.spawn_wall(wall, scene, hue),
        };
        match spawned {
            Ok(body) => {
                debug!("materialised obstacle {index} ({})", obstacle.display_name());
                self.instances.push(LiveInstance {
                    definition_index: index,
                    body,
                });
                true
            }
            Err(err) => {
                warn!(
                    "failed to materialise obstacle {index} ({}): {err}",
                    obstacle.display_name()
                );
                false
            }
        }
    }

    fn spawn_wall<S: SceneHost + ?Sized>(
        &self,
        wall: &Wall,
        scene: &mut S,
        hue: f32,
    ) -> Result<LiveBody, SpawnError> {
        let mut volumes = Vec::new();
        if self.collision_bounds {
            let volume = derive_box(wall.first, wall.second, wall.yaw);
            let handle = scene.create_solid(&SpawnRequest::CollisionVolume {
                center: volume.center,
                half_extents: volume.half_extents,
                yaw: volume.yaw,
            })?;
            volumes.push(OwnedEntity::new(handle));
        }

        let paint = if wall.rainbow {
            WirePaint::Rainbow { hue }
        } else {
            WirePaint::Solid(wall.color)
        };
        let mut wireframe = Vec::new();
        for segment in generate_wireframe(wall.first, wall.second, paint, wall.yaw) {
            let request = SpawnRequest::Beam {
                start: segment.start,
                end: segment.end,
                color: segment.color,
            };
            match scene.create_solid(&request) {
                Ok(handle) => wireframe.push(OwnedEntity::new(handle)),
                Err(err) => warn!("wireframe segment skipped: {err}"),
            }
        }

        if volumes.is_empty() && wireframe.is_empty() {
            return Err(SpawnError::Refused("wall"));
        }
        Ok(LiveBody::Wall { volumes, wireframe })
    }
}

fn spawn_prop<S: SceneHost + ?Sized>(prop: &Prop, scene: &mut S) -> Result<OwnedEntity, SpawnError> {
    if !prop.model_path.ends_with(MODEL_SUFFIX) {
        return Err(SpawnError::InvalidModel(prop.model_path.clone()));
    }
    let handle = scene.create_solid(&SpawnRequest::Prop {
        model_path: prop.model_path.clone(),
        position: prop.position,
        angles: prop.angles,
        scale: clamp_scale(prop.scale),
    })?;
    if !prop.visible {
        set_visibility(scene, handle, false);
    }
    if prop.tint != Rgb::WHITE {
        scene.set_visual(handle, VisualProperty::Tint(prop.tint));
    }
    Ok(OwnedEntity::new(handle))
}

fn set_visibility<S: SceneHost + ?Sized>(scene: &mut S, handle: EntityHandle, visible: bool) {
    scene.set_visual(handle, VisualProperty::Alpha(if visible { 255 } else { 0 }));
    scene.set_visual(handle, VisualProperty::NoDraw(!visible));
}
