#![allow(dead_code)]

use blocker_engine::obstacle::Obstacle;
use blocker_engine::sim::SimHost;
use blocker_engine::{Engine, MemoryBackend};
use blocker_formats::{DataFile, ModelEntry, Settings};
use glam::Vec3;

pub const ZONE: &str = "maps/de_dust2.vpk";
pub const ZONE_ID: &str = "de_dust2";
pub const OPERATOR: usize = 0;
pub const PERMISSION: &str = "@admin/bp";

pub fn settings(min_players_to_open: usize) -> Settings {
    Settings {
        min_players_to_open,
        models: vec![ModelEntry::new("Crate", "models/props/crate.vmdl")],
        ..Settings::default()
    }
}

pub fn seeded_backend(obstacles: &[Obstacle]) -> MemoryBackend {
    let mut file = DataFile::default();
    file.replace_section(
        ZONE_ID,
        obstacles.iter().map(Obstacle::to_record).collect(),
    );
    MemoryBackend::with_file(file)
}

pub fn crate_at(x: f32) -> Obstacle {
    Obstacle::prop(
        format!("crate {x}"),
        "models/props/crate.vmdl",
        Vec3::new(x, 0.0, 0.0),
    )
}

pub fn fence() -> Obstacle {
    Obstacle::wall("fence", Vec3::ZERO, Vec3::new(100.0, 0.0, 50.0))
}

/// Host with `humans` connected occupants; slot 0 holds the edit permission.
pub fn host_with(humans: usize) -> SimHost {
    let mut host = SimHost::new();
    host.fill_humans(humans);
    host.grant_permission(OPERATOR, PERMISSION);
    host
}

/// Engine with the zone loaded and the round-start reconcile already run.
pub fn started(
    host: SimHost,
    min_players_to_open: usize,
    obstacles: &[Obstacle],
) -> (Engine<SimHost>, MemoryBackend) {
    let backend = seeded_backend(obstacles);
    let mut engine = Engine::new(
        host,
        settings(min_players_to_open),
        Box::new(backend.clone()),
    );
    engine.on_zone_start(ZONE);
    engine.on_round_start(ZONE);
    engine.advance_time(0.2);
    (engine, backend)
}
