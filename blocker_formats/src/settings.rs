use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub path: String,
}

impl ModelEntry {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        ModelEntry {
            label: label.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub min_players_to_open: usize,
    /// Leave spectators out of the head count.
    pub ignore_spectators: bool,
    pub access_permission: String,
    pub access_flag: String,
    pub debug_log: bool,
    #[serde(default)]
    pub models: Vec<ModelEntry>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            min_players_to_open: 10,
            ignore_spectators: false,
            access_permission: "@admin/bp".to_string(),
            access_flag: String::new(),
            debug_log: true,
            models: vec![
                ModelEntry::new(
                    "Rollup door",
                    "models/props/de_dust/hr_dust/dust_windows/dust_rollupdoor_96x128_surface_lod.vmdl",
                ),
                ModelEntry::new(
                    "Chainlink fence",
                    "models/props/de_nuke/hr_nuke/chainlink_fence_001/chainlink_fence_001_256_capped.vmdl",
                ),
            ],
        }
    }
}

impl Settings {
    /// Loads settings, falling back to the built-in defaults when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse settings file: {}", path.display()))
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// The placeable model list: entries without a path are skipped and an
    /// empty label falls back to the path.
    pub fn model_catalog(&self) -> Vec<ModelEntry> {
        self.models
            .iter()
            .filter(|entry| !entry.path.trim().is_empty())
            .map(|entry| {
                let label = if entry.label.trim().is_empty() {
                    entry.path.clone()
                } else {
                    entry.label.clone()
                };
                ModelEntry::new(label, entry.path.clone())
            })
            .collect()
    }
}
