use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use blocker_formats::{DataFile, ObstacleRecord};
use log::{debug, info};
use thiserror::Error;

use crate::obstacle::Obstacle;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no zone is loaded")]
    NoZone,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Persistence seam for zone sections.
pub trait SectionBackend {
    /// `Ok(None)` when the zone has never been saved.
    fn load_section(&mut self, zone: &str) -> Result<Option<Vec<ObstacleRecord>>, StoreError>;
    /// Replaces the zone's section, leaving other zones untouched.
    fn save_section(&mut self, zone: &str, records: Vec<ObstacleRecord>) -> Result<(), StoreError>;
}

/// Re-reads the data file on every access so hand edits between rounds are
/// picked up and sections of other zones survive a save.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileBackend { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SectionBackend for JsonFileBackend {
    fn load_section(&mut self, zone: &str) -> Result<Option<Vec<ObstacleRecord>>, StoreError> {
        if !self.path.exists() {
            debug!("no data file yet at {}", self.path.display());
            return Ok(None);
        }
        let file = DataFile::open(&self.path)?;
        Ok(file.section(zone).map(<[ObstacleRecord]>::to_vec))
    }

    fn save_section(&mut self, zone: &str, records: Vec<ObstacleRecord>) -> Result<(), StoreError> {
        let mut file = DataFile::open(&self.path)?;
        file.replace_section(zone, records);
        file.save(&self.path)?;
        Ok(())
    }
}

/// In-memory backend; clones share the same document.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    file: Rc<RefCell<DataFile>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(file: DataFile) -> Self {
        MemoryBackend {
            file: Rc::new(RefCell::new(file)),
        }
    }

    pub fn snapshot(&self) -> DataFile {
        self.file.borrow().clone()
    }
}

impl SectionBackend for MemoryBackend {
    fn load_section(&mut self, zone: &str) -> Result<Option<Vec<ObstacleRecord>>, StoreError> {
        Ok(self.file.borrow().section(zone).map(<[ObstacleRecord]>::to_vec))
    }

    fn save_section(&mut self, zone: &str, records: Vec<ObstacleRecord>) -> Result<(), StoreError> {
        self.file.borrow_mut().replace_section(zone, records);
        Ok(())
    }
}

/// Ordered obstacle definitions of the active zone. An obstacle's identity is
/// its position in this list.
pub struct ObstacleStore {
    zone: Option<String>,
    obstacles: Vec<Obstacle>,
    backend: Box<dyn SectionBackend>,
}

impl ObstacleStore {
    pub fn new(backend: Box<dyn SectionBackend>) -> Self {
        ObstacleStore {
            zone: None,
            obstacles: Vec::new(),
            backend,
        }
    }

    pub fn zone(&self) -> Option<&str> {
        self.zone.as_deref()
    }

    /// Replaces the collection with the zone's persisted entries. The zone
    /// becomes active even when reading fails, leaving the store empty.
    pub fn load(&mut self, zone: &str) -> Result<usize, StoreError> {
        self.zone = Some(zone.to_string());
        self.obstacles.clear();

        let Some(records) = self.backend.load_section(zone)? else {
            debug!("no section for zone {zone}");
            return Ok(0);
        };
        self.obstacles = records.iter().filter_map(Obstacle::from_record).collect();
        info!("loaded {} obstacles for zone {zone}", self.obstacles.len());
        Ok(self.obstacles.len())
    }

    /// Writes the whole collection as the active zone's section.
    pub fn save(&mut self) -> Result<(), StoreError> {
        let zone = self.zone.as_deref().ok_or(StoreError::NoZone)?;
        let records = self.obstacles.iter().map(Obstacle::to_record).collect();
        self.backend.save_section(zone, records)?;
        debug!("saved {} obstacles for zone {zone}", self.obstacles.len());
        Ok(())
    }

    pub fn unload(&mut self) {
        self.zone = None;
        self.obstacles.clear();
    }

    pub fn append(&mut self, obstacle: Obstacle) -> usize {
        self.obstacles.push(obstacle);
        self.obstacles.len() - 1
    }

    /// Removes the definition; every later index shifts down by one.
    pub fn remove(&mut self, index: usize) -> Option<Obstacle> {
        if index < self.obstacles.len() {
            Some(self.obstacles.remove(index))
        } else {
            None
        }
    }

    pub fn mutate<R>(&mut self, index: usize, edit: impl FnOnce(&mut Obstacle) -> R) -> Option<R> {
        self.obstacles.get_mut(index).map(edit)
    }

    pub fn get(&self, index: usize) -> Option<&Obstacle> {
        self.obstacles.get(index)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.iter()
    }
}
