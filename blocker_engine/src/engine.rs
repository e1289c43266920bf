use std::fmt;

use blocker_formats::{normalize_zone_id, ModelEntry, Settings};
use log::{debug, info, warn};
use serde::Serialize;

use crate::access::{AccessError, AccessPolicy};
use crate::editing::session::{EditingSessions, PingMode};
use crate::gate::OccupancyGate;
use crate::host::{Host, Notice, Recipient, Slot};
use crate::rainbow::{RainbowDriver, RAINBOW_INTERVAL};
use crate::registry::{LiveRegistry, ReconcileReport};
use crate::scheduler::{Task, TaskOutcome, TaskScheduler};
use crate::store::{ObstacleStore, SectionBackend};

/// Delay between a round restart and the gate evaluation it triggers.
pub const ROUND_START_DELAY: f64 = 0.1;

/// Owns every piece of per-zone state and the host it drives.
pub struct Engine<H: Host> {
    pub(crate) host: H,
    pub(crate) settings: Settings,
    pub(crate) catalog: Vec<ModelEntry>,
    pub(crate) gate: OccupancyGate,
    pub(crate) access: AccessPolicy,
    pub(crate) store: ObstacleStore,
    pub(crate) registry: LiveRegistry,
    pub(crate) sessions: EditingSessions,
    pub(crate) rainbow: RainbowDriver,
    pub(crate) scheduler: TaskScheduler,
}

impl<H: Host> Engine<H> {
    pub fn new(host: H, settings: Settings, backend: Box<dyn SectionBackend>) -> Self {
        let collision_bounds = host.supports_collision_bounds();
        if !collision_bounds {
            warn!("host cannot size collision volumes; walls will be visual only");
        }
        Engine {
            catalog: settings.model_catalog(),
            gate: OccupancyGate::from_settings(&settings),
            access: AccessPolicy::from_settings(&settings),
            store: ObstacleStore::new(backend),
            registry: LiveRegistry::new(collision_bounds),
            sessions: EditingSessions::new(),
            rainbow: RainbowDriver::new(),
            scheduler: TaskScheduler::new(),
            settings,
            host,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &[ModelEntry] {
        &self.catalog
    }

    pub fn store(&self) -> &ObstacleStore {
        &self.store
    }

    pub fn registry(&self) -> &LiveRegistry {
        &self.registry
    }

    pub fn sessions(&self) -> &EditingSessions {
        &self.sessions
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    pub fn rainbow(&self) -> &RainbowDriver {
        &self.rainbow
    }

    pub fn zone(&self) -> Option<&str> {
        self.store.zone()
    }

    pub fn eligible_count(&self) -> usize {
        self.gate.eligible_count(&self.host)
    }

    pub fn is_open(&self) -> bool {
        self.gate.should_be_open(&self.host)
    }

    pub fn is_authorized(&self, slot: Slot) -> bool {
        self.access.allows(slot, &self.host)
    }

    /// Brings the live set in line with the gate: everything destroyed when
    /// open, every missing definition materialised when closed.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let open = self.is_open();
        if open {
            self.rainbow.cancel();
        }
        let report = self
            .registry
            .reconcile(open, &self.store, &mut self.host, self.rainbow.hue());
        if !open {
            self.arm_rainbow_if_needed();
        }
        debug!(
            "reconcile ({}): {} spawned, {} destroyed, {} failed",
            if open { "open" } else { "closed" },
            report.spawned,
            report.destroyed,
            report.failed
        );
        report
    }

    pub(crate) fn arm_rainbow_if_needed(&mut self) {
        if self.registry.rainbow_walls(&self.store).next().is_none() {
            return;
        }
        if let Some(generation) = self.rainbow.arm() {
            self.scheduler
                .schedule(RAINBOW_INTERVAL, Task::RainbowTick { generation });
        }
    }

    /// Saves the active zone; failures are logged and never fatal.
    pub(crate) fn persist(&mut self) -> bool {
        match self.store.save() {
            Ok(()) => true,
            Err(err) => {
                warn!("failed to save obstacles: {err}");
                false
            }
        }
    }

    pub fn on_zone_start(&mut self, zone_name: &str) {
        let zone = normalize_zone_id(zone_name);
        self.teardown();
        match self.store.load(&zone) {
            Ok(count) => info!("zone {zone} started with {count} obstacles"),
            Err(err) => warn!("failed to load obstacles for zone {zone}: {err}"),
        }
    }

    pub fn on_zone_end(&mut self) {
        if let Some(zone) = self.store.zone() {
            debug!("zone {zone} ending");
        }
        self.teardown();
    }

    /// The host has already removed every entity when a round restarts, so
    /// live records are forgotten rather than destroyed.
    pub fn on_round_start(&mut self, zone_name: &str) {
        self.registry.forget_all();
        self.rainbow.cancel();
        self.scheduler.clear();

        let zone = normalize_zone_id(zone_name);
        if self.store.zone() != Some(zone.as_str()) {
            info!("round started on new zone {zone}, reloading obstacles");
            self.access.clear_overrides();
            if let Err(err) = self.store.load(&zone) {
                warn!("failed to load obstacles for zone {zone}: {err}");
            }
        }
        self.sessions.reset_all();
        self.scheduler.schedule(ROUND_START_DELAY, Task::ApplyGate);

        if !self.is_open() {
            let min_players = self.gate.min_occupants_to_open;
            self.host
                .notify(Recipient::Everyone, Notice::PassageClosed { min_players });
        }
    }

    /// Runs every scheduled task due within the next `dt` seconds, in order.
    pub fn advance_time(&mut self, dt: f64) {
        let until = self.scheduler.now() + dt.max(0.0);
        while let Some(entry) = self.scheduler.pop_due(until) {
            match self.run_task(entry.task) {
                TaskOutcome::Reschedule(delay) => self.scheduler.schedule(delay, entry.task),
                TaskOutcome::Done => {}
            }
        }
        self.scheduler.settle(until);
    }

    fn run_task(&mut self, task: Task) -> TaskOutcome {
        match task {
            Task::ApplyGate => {
                self.reconcile();
                TaskOutcome::Done
            }
            Task::RainbowTick { generation } => {
                self.rainbow
                    .tick(generation, &self.registry, &self.store, &mut self.host)
            }
        }
    }

    /// Destroys everything; the engine is about to go away.
    pub fn unload(&mut self) {
        self.teardown();
        self.store.unload();
    }

    fn teardown(&mut self) {
        let destroyed = self.registry.clear(&mut self.host);
        if destroyed > 0 {
            debug!("destroyed {destroyed} live obstacles");
        }
        self.rainbow.cancel();
        self.scheduler.clear();
        self.sessions.reset_all();
        self.access.clear_overrides();
    }

    /// Lets the occupant with `steam_id` edit until the zone changes.
    pub fn grant_temporary_access(&mut self, steam_id: u64) -> Result<Slot, AccessError> {
        let slot = self
            .host
            .slot_for_steam_id(steam_id)
            .ok_or(AccessError::UnknownSteamId(steam_id))?;
        self.access.grant(slot, steam_id);
        info!("temporary editing access granted to slot {slot} ({steam_id})");
        Ok(slot)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let obstacles = self
            .store
            .iter()
            .enumerate()
            .map(|(index, obstacle)| ObstacleSummary {
                index,
                label: obstacle.display_name().to_string(),
                kind: if obstacle.is_wall() { "wall" } else { "prop" },
                anchor: obstacle.anchor().to_array(),
                live: self.registry.is_live(index),
            })
            .collect();
        let live = self
            .registry
            .iter()
            .map(|instance| LiveSummary {
                index: instance.definition_index(),
                primary: instance.primary_handle().map(|handle| handle.0),
                collision_volumes: instance.collision_handles().len(),
                wireframe_segments: instance.wireframe_handles().len(),
            })
            .collect();
        StateSnapshot {
            zone: self.store.zone().map(str::to_string),
            open: self.is_open(),
            eligible: self.eligible_count(),
            min_occupants_to_open: self.gate.min_occupants_to_open,
            collision_bounds: self.registry.collision_bounds(),
            obstacles,
            live,
            sessions: self
                .sessions
                .iter()
                .map(|(slot, session)| (slot, session.ping))
                .collect(),
            overrides: self.access.overrides().collect(),
            rainbow_running: self.rainbow.is_running(),
            hue: self.rainbow.hue(),
            pending_tasks: self.scheduler.len(),
        }
    }

    /// Console-only diagnostic text.
    pub fn dump_state(&self) -> String {
        self.snapshot().to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleSummary {
    pub index: usize,
    pub label: String,
    pub kind: &'static str,
    pub anchor: [f32; 3],
    pub live: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LiveSummary {
    pub index: usize,
    pub primary: Option<u64>,
    pub collision_volumes: usize,
    pub wireframe_segments: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub zone: Option<String>,
    pub open: bool,
    pub eligible: usize,
    pub min_occupants_to_open: usize,
    pub collision_bounds: bool,
    pub obstacles: Vec<ObstacleSummary>,
    pub live: Vec<LiveSummary>,
    pub sessions: Vec<(Slot, PingMode)>,
    pub overrides: Vec<Slot>,
    pub rainbow_running: bool,
    pub hue: f32,
    pub pending_tasks: usize,
}

impl fmt::Display for StateSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "zone: {}", self.zone.as_deref().unwrap_or("<none>"))?;
        writeln!(
            f,
            "gate: {} ({} of {} eligible)",
            if self.open { "open" } else { "closed" },
            self.eligible,
            self.min_occupants_to_open
        )?;
        if !self.collision_bounds {
            writeln!(f, "collision volumes unavailable, walls are visual only")?;
        }
        writeln!(f, "obstacles: {}", self.obstacles.len())?;
        for obstacle in &self.obstacles {
            let [x, y, z] = obstacle.anchor;
            writeln!(
                f,
                "  #{} {} [{}] at ({x:.1} {y:.1} {z:.1}){}",
                obstacle.index,
                obstacle.label,
                obstacle.kind,
                if obstacle.live { " live" } else { "" }
            )?;
        }
        writeln!(f, "live instances: {}", self.live.len())?;
        for live in &self.live {
            write!(f, "  #{} primary=", live.index)?;
            match live.primary {
                Some(handle) => write!(f, "{handle}")?,
                None => write!(f, "-")?,
            }
            writeln!(
                f,
                " volumes={} segments={}",
                live.collision_volumes, live.wireframe_segments
            )?;
        }
        for (slot, ping) in &self.sessions {
            if *ping != PingMode::Idle {
                writeln!(f, "session {slot}: {ping:?}")?;
            }
        }
        if !self.overrides.is_empty() {
            writeln!(f, "access overrides: {:?}", self.overrides)?;
        }
        writeln!(
            f,
            "rainbow: {} (hue {:.0}), pending tasks: {}",
            if self.rainbow_running { "running" } else { "idle" },
            self.hue,
            self.pending_tasks
        )
    }
}
