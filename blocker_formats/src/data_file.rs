use std::{collections::BTreeMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_WALL_COLOR: [u8; 3] = [255, 0, 0];
pub const DEFAULT_TINT: [u8; 3] = [255, 255, 255];

/// One persisted obstacle. Props and walls share the flat key set; the keys
/// that do not belong to a record's kind are written with their defaults and
/// ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleRecord {
    pub label: String,
    pub path: String,
    pub px: f32,
    pub py: f32,
    pub pz: f32,
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
    pub sc: f32,
    pub iv: u8,
    pub wall: u8,
    pub p2x: f32,
    pub p2y: f32,
    pub p2z: f32,
    pub wyaw: f32,
    pub wc: [u8; 3],
    pub rainbow: u8,
    pub tint: [u8; 3],
}

impl Default for ObstacleRecord {
    fn default() -> Self {
        ObstacleRecord {
            label: String::new(),
            path: String::new(),
            px: 0.0,
            py: 0.0,
            pz: 0.0,
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            sc: 1.0,
            iv: 0,
            wall: 0,
            p2x: 0.0,
            p2y: 0.0,
            p2z: 0.0,
            wyaw: 0.0,
            wc: DEFAULT_WALL_COLOR,
            rainbow: 0,
            tint: DEFAULT_TINT,
        }
    }
}

impl ObstacleRecord {
    pub fn is_wall(&self) -> bool {
        self.wall != 0
    }

    /// Props need a model path; walls only need the wall flag.
    pub fn is_loadable(&self) -> bool {
        self.is_wall() || !self.path.trim().is_empty()
    }
}

/// The whole obstacle data file: one ordered section per zone id.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DataFile {
    sections: BTreeMap<String, Vec<ObstacleRecord>>,
}

impl DataFile {
    /// Reads the data file, treating a missing file as empty.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read data file: {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("failed to parse data file: {}", path.display()))
    }

    /// Parses the document. Records that fail to decode or lack their
    /// required fields are dropped without failing the whole file.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let document: BTreeMap<String, Vec<Value>> = serde_json::from_str(raw)?;
        let sections = document
            .into_iter()
            .map(|(zone, entries)| {
                let records = entries
                    .into_iter()
                    .filter_map(|entry| serde_json::from_value::<ObstacleRecord>(entry).ok())
                    .filter(ObstacleRecord::is_loadable)
                    .collect();
                (zone, records)
            })
            .collect();
        Ok(DataFile { sections })
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.sections).context("serializing obstacle data to JSON")
    }

    pub fn section(&self, zone: &str) -> Option<&[ObstacleRecord]> {
        self.sections.get(zone).map(Vec::as_slice)
    }

    pub fn has_section(&self, zone: &str) -> bool {
        self.sections.contains_key(zone)
    }

    /// Replaces the zone's section wholesale. An empty list still leaves an
    /// (empty) section behind.
    pub fn replace_section(&mut self, zone: &str, records: Vec<ObstacleRecord>) {
        self.sections.insert(zone.to_string(), records);
    }

    pub fn zones(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory: {}", parent.display())
                })?;
            }
        }
        let serialized = self.to_json_string()?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write data file: {}", path.display()))
    }
}
