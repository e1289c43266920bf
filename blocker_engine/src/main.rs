use std::fs;

use anyhow::{Context, Result};
use blocker_engine::console::run_console_command;
use blocker_engine::engine::ROUND_START_DELAY;
use blocker_engine::sim::{SimHost, SIM_STEAM_ID_BASE};
use blocker_engine::{logging, Engine, JsonFileBackend};
use blocker_formats::Settings;
use log::warn;

mod cli;

fn main() -> Result<()> {
    let args = cli::parse()?;

    let mut settings = Settings::load(&args.settings)
        .with_context(|| format!("loading settings from {}", args.settings.display()))?;
    if args.ignore_observers {
        settings.ignore_spectators = true;
    }
    logging::init(args.verbose || settings.debug_log);

    let mut host = SimHost::new();
    host.fill_humans(args.occupants);
    for slot in args.occupants..args.occupants + args.observers {
        host.connect_observer(slot, SIM_STEAM_ID_BASE + slot as u64);
    }

    let backend = JsonFileBackend::new(&args.data);
    let mut engine = Engine::new(host, settings, Box::new(backend));
    engine.on_zone_start(&args.zone);
    engine.on_round_start(&args.zone);
    engine.advance_time(ROUND_START_DELAY * 2.0);

    for steam_id in &args.grant {
        match run_console_command(&mut engine, &format!("bp_grant {steam_id}")) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!("grant for {steam_id} failed: {err}"),
        }
    }

    let dump = run_console_command(&mut engine, "bp_dump").context("dumping engine state")?;
    print!("{dump}");
    println!(
        "Entities live in host: {} (created {}, destroyed {})",
        engine.host().live_count(),
        engine.host().created(),
        engine.host().destroyed()
    );

    if let Some(path) = args.dump_json.as_ref() {
        let json = serde_json::to_string_pretty(&engine.snapshot())
            .context("serializing engine state to JSON")?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, json)
            .with_context(|| format!("writing engine state to {}", path.display()))?;
        println!("Saved engine state JSON to {}", path.display());
    }

    engine.unload();
    Ok(())
}
