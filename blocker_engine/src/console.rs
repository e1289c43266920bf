//! Server-console commands. Output goes to the console only, never to
//! players.

use std::str::FromStr;

use thiserror::Error;

use crate::access::AccessError;
use crate::engine::Engine;
use crate::host::Host;

pub const GRANT_COMMAND: &str = "bp_grant";
pub const DUMP_COMMAND: &str = "bp_dump";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Grant(u64),
    Dump,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    #[error("unknown command `{0}`")]
    Unknown(String),
    #[error("usage: bp_grant <steamid64>")]
    MissingSteamId,
    #[error("`{0}` is not a steam id")]
    InvalidSteamId(String),
    #[error(transparent)]
    Access(#[from] AccessError),
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        match words.next() {
            Some(GRANT_COMMAND) => {
                let raw = words.next().ok_or(ConsoleError::MissingSteamId)?;
                raw.parse::<u64>()
                    .map(ConsoleCommand::Grant)
                    .map_err(|_| ConsoleError::InvalidSteamId(raw.to_string()))
            }
            Some(DUMP_COMMAND) => Ok(ConsoleCommand::Dump),
            Some(other) => Err(ConsoleError::Unknown(other.to_string())),
            None => Err(ConsoleError::Unknown(String::new())),
        }
    }
}

/// Parses and runs one console line, returning the text to print.
pub fn run_console_command<H: Host>(
    engine: &mut Engine<H>,
    line: &str,
) -> Result<String, ConsoleError> {
    match line.parse::<ConsoleCommand>()? {
        ConsoleCommand::Grant(steam_id) => {
            let slot = engine.grant_temporary_access(steam_id)?;
            Ok(format!(
                "slot {slot} may edit obstacles until the zone changes"
            ))
        }
        ConsoleCommand::Dump => Ok(engine.dump_state()),
    }
}
