use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::tempdir;

const DATA: &str = r#"{
  "de_dust2": [
    { "label": "door", "path": "models/props/door.vmdl", "px": 10, "py": 20, "pz": 0 },
    { "label": "fence", "wall": 1, "px": 0, "py": 0, "pz": 0, "p2x": 128, "p2y": 0, "p2z": 64 }
  ],
  "de_nuke": []
}"#;

fn run(dir: &Path, extra: &[&str]) -> Result<Output> {
    let settings = dir.join("settings.json");
    let data = dir.join("bp_data.json");
    let mut args = vec![
        "--settings".to_string(),
        settings.to_str().context("settings path is not UTF-8")?.to_string(),
        "--data".to_string(),
        data.to_str().context("data path is not UTF-8")?.to_string(),
        "--zone".to_string(),
        "maps/de_dust2.vpk".to_string(),
    ];
    args.extend(extra.iter().map(|arg| arg.to_string()));
    Command::new(env!("CARGO_BIN_EXE_blocker_engine"))
        .args(&args)
        .output()
        .context("executing blocker_engine")
}

#[test]
fn closed_round_reports_live_obstacles() -> Result<()> {
    let dir = tempdir().context("creating temporary directory")?;
    fs::write(dir.path().join("bp_data.json"), DATA)?;
    fs::write(
        dir.path().join("settings.json"),
        r#"{ "min_players_to_open": 4, "debug_log": false }"#,
    )?;
    let snapshot_path = dir.path().join("out").join("state.json");
    let snapshot_str = snapshot_path
        .to_str()
        .context("snapshot path is not UTF-8")?;

    let output = run(
        dir.path(),
        &[
            "--occupants",
            "3",
            "--grant",
            "76561198000000001",
            "--dump-json",
            snapshot_str,
        ],
    )?;
    assert!(
        output.status.success(),
        "blocker_engine exited with {:?}",
        output.status
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("zone: de_dust2"), "{stdout}");
    assert!(stdout.contains("gate: closed (3 of 4 eligible)"), "{stdout}");
    assert!(stdout.contains("slot 1 may edit obstacles"), "{stdout}");

    let snapshot: Value = serde_json::from_str(&fs::read_to_string(&snapshot_path)?)?;
    assert_eq!(snapshot["open"], false);
    assert_eq!(snapshot["obstacles"].as_array().map(Vec::len), Some(2));
    assert_eq!(snapshot["live"].as_array().map(Vec::len), Some(2));
    assert_eq!(snapshot["overrides"], serde_json::json!([1]));
    Ok(())
}

#[test]
fn open_round_leaves_the_data_file_untouched() -> Result<()> {
    let dir = tempdir().context("creating temporary directory")?;
    let data_path = dir.path().join("bp_data.json");
    fs::write(&data_path, DATA)?;
    fs::write(
        dir.path().join("settings.json"),
        r#"{ "min_players_to_open": 4, "debug_log": false }"#,
    )?;

    let output = run(dir.path(), &["--occupants", "2", "--observers", "2"])?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gate: open (4 of 4 eligible)"), "{stdout}");
    assert!(stdout.contains("live instances: 0"), "{stdout}");
    assert_eq!(fs::read_to_string(&data_path)?, DATA);

    let output = run(
        dir.path(),
        &["--occupants", "2", "--observers", "2", "--ignore-observers"],
    )?;
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("gate: closed (2 of 4 eligible)"), "{stdout}");
    Ok(())
}

#[test]
fn too_many_occupants_is_rejected() -> Result<()> {
    let dir = tempdir().context("creating temporary directory")?;
    let output = run(dir.path(), &["--occupants", "60", "--observers", "10"])?;
    assert!(!output.status.success());
    Ok(())
}
