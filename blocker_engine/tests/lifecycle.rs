mod common;

use blocker_engine::color::hue_to_rgb;
use blocker_engine::host::{Notice, Recipient, SpawnRequest};
use blocker_engine::obstacle::{Obstacle, ObstacleKind};
use blocker_engine::sim::SimHost;
use blocker_engine::Engine;
use common::{crate_at, fence, host_with, started, ZONE, ZONE_ID};
use glam::Vec3;

fn rainbow_fence() -> Obstacle {
    let mut wall = fence();
    if let ObstacleKind::Wall(shape) = &mut wall.kind {
        shape.rainbow = true;
    }
    wall
}

#[test]
fn closed_below_threshold_and_cleared_when_it_is_reached() {
    let (mut engine, _) = started(host_with(9), 10, &[crate_at(0.0), fence()]);

    assert_eq!(engine.zone(), Some(ZONE_ID));
    assert!(!engine.is_open());
    assert_eq!(engine.registry().len(), 2);
    assert_eq!(engine.host().count_kind("prop"), 1);
    assert_eq!(engine.host().count_kind("collision volume"), 1);
    assert_eq!(engine.host().count_kind("beam"), 24);
    assert!(engine.host().notices().contains(&(
        Recipient::Everyone,
        Notice::PassageClosed { min_players: 10 }
    )));

    engine.host_mut().fill_humans(1);
    let report = engine.reconcile();
    assert!(engine.is_open());
    assert_eq!(report.destroyed, 2);
    assert!(engine.registry().is_empty());
    assert_eq!(engine.host().live_count(), 0);
    assert_eq!(engine.host().stray_destroys(), 0);
}

#[test]
fn open_round_announces_nothing_and_spawns_nothing() {
    let (engine, _) = started(host_with(12), 10, &[crate_at(0.0), fence()]);
    assert!(engine.is_open());
    assert!(engine.registry().is_empty());
    assert_eq!(engine.host().created(), 0);
    assert!(engine.host().notices().is_empty());
}

#[test]
fn reconcile_is_idempotent_in_either_state() {
    let (mut engine, _) = started(host_with(1), 10, &[crate_at(0.0), fence()]);
    let created = engine.host().created();

    let again = engine.reconcile();
    assert_eq!((again.spawned, again.destroyed, again.failed), (0, 0, 0));
    assert_eq!(engine.host().created(), created);

    engine.host_mut().fill_humans(20);
    engine.reconcile();
    let destroyed = engine.host().destroyed();
    let again = engine.reconcile();
    assert_eq!((again.spawned, again.destroyed), (0, 0));
    assert_eq!(engine.host().destroyed(), destroyed);
}

#[test]
fn round_restart_rebuilds_without_double_release() {
    let (mut engine, _) = started(host_with(1), 10, &[crate_at(0.0), fence()]);
    assert_eq!(engine.registry().len(), 2);

    engine.host_mut().restart_round();
    engine.on_round_start(ZONE);
    assert!(engine.registry().is_empty());
    assert_eq!(engine.scheduler().len(), 1);

    engine.advance_time(0.05);
    assert!(engine.registry().is_empty());
    engine.advance_time(0.1);
    assert_eq!(engine.registry().len(), 2);
    assert_eq!(engine.host().live_count(), 26);
    assert_eq!(engine.host().stray_destroys(), 0);
}

#[test]
fn walls_degrade_to_wireframe_without_collision_bounds() {
    let host = SimHost::new().without_collision_bounds();
    let (engine, _) = started(host, 10, &[fence()]);

    let instance = engine.registry().get(0).expect("wall is live");
    assert!(instance.collision_handles().is_empty());
    assert_eq!(instance.wireframe_handles().len(), 24);
    assert_eq!(instance.primary_handle(), None);
    assert_eq!(engine.host().count_kind("collision volume"), 0);
    assert!(engine.dump_state().contains("walls are visual only"));
}

#[test]
fn wall_collision_volume_matches_its_corners() {
    let (engine, _) = started(SimHost::new(), 10, &[fence()]);
    let handle = engine
        .registry()
        .get(0)
        .and_then(|instance| instance.primary_handle())
        .expect("collision volume");
    let entity = engine.host().entity(handle).expect("entity exists");
    assert_eq!(
        entity.request,
        SpawnRequest::CollisionVolume {
            center: Vec3::new(50.0, 0.0, 25.0),
            half_extents: Vec3::new(50.0, 1.0, 25.0),
            yaw: 0.0,
        }
    );
}

#[test]
fn failed_spawns_are_retried_on_the_next_reconcile() {
    let mut host = SimHost::new();
    host.set_entity_limit(Some(0));
    let (mut engine, _) = started(host, 10, &[crate_at(0.0), fence()]);
    assert!(engine.registry().is_empty());

    engine.host_mut().set_entity_limit(None);
    let report = engine.reconcile();
    assert_eq!(report.spawned, 2);
    assert_eq!(engine.registry().len(), 2);
}

#[test]
fn props_without_a_compiled_model_stay_absent() {
    let broken = Obstacle::prop("old", "models/props/crate.mdl", Vec3::ZERO);
    let (mut engine, _) = started(SimHost::new(), 10, &[broken, fence()]);
    assert!(!engine.registry().is_live(0));
    assert!(engine.registry().is_live(1));

    let report = engine.reconcile();
    assert_eq!((report.spawned, report.failed), (0, 1));
}

#[test]
fn rainbow_walls_cycle_until_none_remain() {
    let (mut engine, _) = started(SimHost::new(), 10, &[rainbow_fence(), crate_at(0.0)]);
    assert!(engine.rainbow().is_running());

    engine.advance_time(0.35);
    let hue = engine.rainbow().hue();
    assert!(hue > 0.0);
    let expected = hue_to_rgb(hue);
    let instance = engine.registry().get(0).expect("wall is live");
    for handle in instance.wireframe_handles() {
        let color = engine.host().entity(handle).and_then(|entity| entity.beam_color());
        assert_eq!(color, Some(expected));
    }

    assert!(engine.delete_obstacle(0));
    engine.advance_time(0.5);
    assert!(!engine.rainbow().is_running());
    assert!(engine.scheduler().is_empty());
    let settled = engine.rainbow().hue();
    engine.advance_time(1.0);
    assert_eq!(engine.rainbow().hue(), settled);
}

#[test]
fn opening_cancels_the_rainbow_tick() {
    let (mut engine, _) = started(SimHost::new(), 2, &[rainbow_fence()]);
    assert!(engine.rainbow().is_running());

    engine.host_mut().fill_humans(2);
    engine.reconcile();
    assert!(!engine.rainbow().is_running());

    let hue = engine.rainbow().hue();
    engine.advance_time(1.0);
    assert_eq!(engine.rainbow().hue(), hue);
    assert!(engine.scheduler().is_empty());
}

#[test]
fn zone_change_tears_down_and_loads_the_new_section() {
    let (mut engine, _) = started(host_with(1), 10, &[crate_at(0.0), fence()]);
    let live = engine.host().live_count();
    assert!(live > 0);

    engine.on_zone_start("maps/de_nuke.vpk | workshop");
    assert_eq!(engine.zone(), Some("de_nuke"));
    assert!(engine.store().is_empty());
    assert!(engine.registry().is_empty());
    assert_eq!(engine.host().live_count(), 0);
    assert_eq!(engine.host().destroyed(), live);
}

#[test]
fn unload_destroys_everything() {
    let (mut engine, _) = started(host_with(1), 10, &[crate_at(0.0), fence()]);
    engine.unload();
    assert_eq!(engine.host().live_count(), 0);
    assert_eq!(engine.zone(), None);
}

#[test]
fn observers_only_count_when_configured() {
    let mut host = SimHost::new();
    host.fill_humans(1);
    host.connect_observer(5, 42);
    host.connect_bot(6);

    let mut settings = common::settings(2);
    let counted = Engine::new(
        host.clone(),
        settings.clone(),
        Box::new(common::seeded_backend(&[crate_at(0.0)])),
    );
    assert_eq!(counted.eligible_count(), 2);
    assert!(counted.is_open());

    settings.ignore_spectators = true;
    let ignored = Engine::new(
        host,
        settings,
        Box::new(common::seeded_backend(&[crate_at(0.0)])),
    );
    assert_eq!(ignored.eligible_count(), 1);
    assert!(!ignored.is_open());
}
