use std::path::PathBuf;

use anyhow::{bail, Result};
use blocker_engine::host::MAX_SLOTS;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Headless host that runs one round of presence-gated obstacles",
    version
)]
pub struct Args {
    /// Settings file (defaults are used when it does not exist)
    #[arg(long, default_value = "configs/blocker_passes.json")]
    pub settings: PathBuf,

    /// Obstacle data file, one section per zone
    #[arg(long, default_value = "data/bp_data.json")]
    pub data: PathBuf,

    /// Zone name as reported by the server, e.g. `maps/de_dust2.vpk`
    #[arg(long, default_value = "de_dust2")]
    pub zone: String,

    /// Connected human occupants
    #[arg(long, default_value_t = 0)]
    pub occupants: usize,

    /// Connected observers, on top of the occupants
    #[arg(long, default_value_t = 0)]
    pub observers: usize,

    /// Leave observers out of the occupancy count
    #[arg(long)]
    pub ignore_observers: bool,

    /// Steam ids to grant temporary editing access (repeatable)
    #[arg(long, value_name = "STEAMID64")]
    pub grant: Vec<u64>,

    /// Force debug logging regardless of the settings file
    #[arg(long)]
    pub verbose: bool,

    /// Path to write the final engine state as JSON
    #[arg(long)]
    pub dump_json: Option<PathBuf>,
}

pub fn parse() -> Result<Args> {
    let args = Args::parse();
    args.validate()?;
    Ok(args)
}

impl Args {
    fn validate(&self) -> Result<()> {
        if self.occupants + self.observers > MAX_SLOTS {
            bail!(
                "{} occupants and {} observers do not fit in {MAX_SLOTS} slots",
                self.occupants,
                self.observers
            );
        }
        if self.zone.trim().is_empty() {
            bail!("--zone must not be empty");
        }
        Ok(())
    }
}
