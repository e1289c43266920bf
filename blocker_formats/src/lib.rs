pub mod data_file;
pub mod settings;
pub mod zone;

pub use data_file::{DataFile, ObstacleRecord};
pub use settings::{ModelEntry, Settings};
pub use zone::normalize_zone_id;
