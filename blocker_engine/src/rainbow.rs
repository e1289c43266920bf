use log::debug;

use crate::color::{hue_to_rgb, wrap_degrees};
use crate::host::{SceneHost, VisualProperty};
use crate::registry::LiveRegistry;
use crate::scheduler::TaskOutcome;
use crate::store::ObstacleStore;

/// Seconds between recolour ticks.
pub const RAINBOW_INTERVAL: f64 = 0.1;
/// Degrees the hue advances per tick.
pub const HUE_STEP: f32 = 10.0;

/// Drives the shared hue of rainbow walls. At most one tick is ever pending;
/// a tick carrying an older generation ends itself.
#[derive(Debug, Clone, Default)]
pub struct RainbowDriver {
    hue: f32,
    generation: u64,
    running: bool,
}

impl RainbowDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns the generation to schedule a tick for, or `None` when a tick
    /// is already pending.
    pub fn arm(&mut self) -> Option<u64> {
        if self.running {
            return None;
        }
        self.running = true;
        self.generation += 1;
        debug!("rainbow animation armed (generation {})", self.generation);
        Some(self.generation)
    }

    pub fn cancel(&mut self) {
        if self.running {
            debug!("rainbow animation cancelled");
        }
        self.running = false;
        self.generation += 1;
    }

    pub fn tick<S: SceneHost + ?Sized>(
        &mut self,
        generation: u64,
        registry: &LiveRegistry,
        store: &ObstacleStore,
        scene: &mut S,
    ) -> TaskOutcome {
        if !self.running || generation != self.generation {
            return TaskOutcome::Done;
        }
        let walls: Vec<_> = registry.rainbow_walls(store).collect();
        if walls.is_empty() {
            debug!("no rainbow walls live, animation stops");
            self.running = false;
            return TaskOutcome::Done;
        }

        self.hue = wrap_degrees(self.hue + HUE_STEP);
        let color = hue_to_rgb(self.hue);
        for handle in walls.iter().flat_map(|instance| instance.wireframe_handles()) {
            scene.set_visual(handle, VisualProperty::BeamColor(color));
        }
        TaskOutcome::Reschedule(RAINBOW_INTERVAL)
    }
}
