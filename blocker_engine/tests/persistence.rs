mod common;

use std::fs;

use anyhow::Result;
use blocker_engine::color::Rgb;
use blocker_engine::editing::MenuId;
use blocker_engine::geometry::Angles;
use blocker_engine::obstacle::{Obstacle, ObstacleKind};
use blocker_engine::sim::SimHost;
use blocker_engine::{Engine, JsonFileBackend};
use blocker_formats::DataFile;
use common::{host_with, settings, OPERATOR, ZONE, ZONE_ID};
use glam::Vec3;
use serde_json::Value;
use tempfile::tempdir;

fn engine_on(path: &std::path::Path, host: SimHost) -> Engine<SimHost> {
    let mut engine = Engine::new(host, settings(10), Box::new(JsonFileBackend::new(path)));
    engine.on_zone_start(ZONE);
    engine.on_round_start(ZONE);
    engine.advance_time(0.2);
    engine
}

#[test]
fn edits_survive_a_zone_reload() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("data").join("bp_data.json");

    let mut engine = engine_on(&path, host_with(1));
    engine.on_command(OPERATOR);
    engine.on_menu_select(OPERATOR, MenuId::Main, "wall");
    engine.on_ping(OPERATOR, Vec3::new(-10.0, 5.0, 0.0));
    engine.on_ping(OPERATOR, Vec3::new(90.0, 5.0, 120.0));
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(0), "yaw:+15");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(0), "color:cyan");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(0), "rainbow:on");

    engine.host_mut().aim(OPERATOR, Some(Vec3::new(300.0, 0.0, 0.0)));
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(0), "back");
    engine.on_menu_select(OPERATOR, MenuId::ObstacleList, "back");
    engine.on_menu_select(OPERATOR, MenuId::Main, "place");
    engine.on_menu_select(OPERATOR, MenuId::ModelPicker, "m:0");
    engine.on_menu_select(OPERATOR, MenuId::Main, "edit");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(1), "pitch:-5");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(1), "vis:off");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(1), "tint:orange");
    engine.on_menu_select(OPERATOR, MenuId::EditObstacle(1), "save");
    let edited: Vec<Obstacle> = engine.store().iter().cloned().collect();
    engine.unload();

    let reloaded = engine_on(&path, SimHost::new());
    let restored: Vec<Obstacle> = reloaded.store().iter().cloned().collect();
    assert_eq!(restored, edited);

    let ObstacleKind::Wall(wall) = &restored[0].kind else {
        panic!("first obstacle should be a wall");
    };
    assert_eq!(wall.yaw, 15.0);
    assert_eq!(wall.color, Rgb::new(0, 255, 255));
    assert!(wall.rainbow);
    let ObstacleKind::Prop(prop) = &restored[1].kind else {
        panic!("second obstacle should be a prop");
    };
    assert_eq!(prop.position, Vec3::new(300.0, 0.0, 0.0));
    assert_eq!(prop.angles, Angles::new(-5.0, 0.0, 0.0));
    assert!(!prop.visible);
    assert_eq!(prop.tint, Rgb::new(255, 128, 0));
    assert!(reloaded.rainbow().is_running());
    Ok(())
}

#[test]
fn saved_records_carry_every_key() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bp_data.json");

    let mut engine = engine_on(&path, host_with(1));
    engine.on_command(OPERATOR);
    engine.on_menu_select(OPERATOR, MenuId::Main, "wall");
    engine.on_ping(OPERATOR, Vec3::ZERO);
    engine.on_ping(OPERATOR, Vec3::ONE);
    engine.unload();

    let document: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
    let record = &document[ZONE_ID][0];
    assert_eq!(record["wall"], 1);
    assert_eq!(record["label"], "Wall 1");
    assert_eq!(record["p2x"], 1.0);
    assert_eq!(record["wc"], serde_json::json!([255, 0, 0]));
    assert_eq!(record["sc"], 1.0);
    assert_eq!(record["tint"], serde_json::json!([255, 255, 255]));
    assert_eq!(record["rainbow"], 0);
    Ok(())
}

#[test]
fn malformed_entries_are_dropped_and_other_zones_kept() -> Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bp_data.json");
    fs::write(
        &path,
        r#"{
  "de_dust2": [
    { "label": "door", "path": "models/door.vmdl", "px": 1, "py": 2, "pz": 3 },
    { "label": "no path" },
    { "path": 17 },
    { "wall": 1, "p2x": 64, "p2y": 8, "p2z": 96 }
  ],
  "de_inferno": [
    { "path": "models/cart.vmdl" }
  ]
}"#,
    )?;

    let mut engine = engine_on(&path, host_with(1));
    assert_eq!(engine.store().len(), 2);
    assert_eq!(engine.registry().len(), 2);
    assert!(engine.store().get(1).is_some_and(Obstacle::is_wall));

    assert!(engine.delete_obstacle(0));
    engine.unload();

    let file = DataFile::open(&path)?;
    assert_eq!(file.section(ZONE_ID).map(<[_]>::len), Some(1));
    assert_eq!(file.section("de_inferno").map(<[_]>::len), Some(1));
    Ok(())
}
