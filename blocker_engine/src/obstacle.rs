use blocker_formats::ObstacleRecord;
use glam::Vec3;

use crate::color::{wrap_degrees, Rgb};
use crate::geometry::{derive_box, Angles};

pub const MIN_SCALE: f32 = 0.05;
pub const MAX_SCALE: f32 = 20.0;
pub const DEFAULT_WALL_COLOR: Rgb = Rgb::RED;

pub fn clamp_scale(scale: f32) -> f32 {
    if scale.is_nan() {
        return 1.0;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub label: String,
    pub kind: ObstacleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObstacleKind {
    Prop(Prop),
    Wall(Wall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prop {
    pub model_path: String,
    pub position: Vec3,
    pub angles: Angles,
    pub scale: f32,
    pub visible: bool,
    pub tint: Rgb,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub first: Vec3,
    pub second: Vec3,
    pub yaw: f32,
    pub color: Rgb,
    pub rainbow: bool,
}

impl Wall {
    pub fn center(&self) -> Vec3 {
        derive_box(self.first, self.second, self.yaw).center
    }

    /// Moves both corners, keeping the wall's shape.
    pub fn translate(&mut self, offset: Vec3) {
        self.first += offset;
        self.second += offset;
    }
}

impl Obstacle {
    pub fn prop(label: impl Into<String>, model_path: impl Into<String>, position: Vec3) -> Self {
        Obstacle {
            label: label.into(),
            kind: ObstacleKind::Prop(Prop {
                model_path: model_path.into(),
                position,
                angles: Angles::default(),
                scale: 1.0,
                visible: true,
                tint: Rgb::WHITE,
            }),
        }
    }

    pub fn wall(label: impl Into<String>, first: Vec3, second: Vec3) -> Self {
        Obstacle {
            label: label.into(),
            kind: ObstacleKind::Wall(Wall {
                first,
                second,
                yaw: 0.0,
                color: DEFAULT_WALL_COLOR,
                rainbow: false,
            }),
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self.kind, ObstacleKind::Wall(_))
    }

    pub fn as_prop(&self) -> Option<&Prop> {
        match &self.kind {
            ObstacleKind::Prop(prop) => Some(prop),
            ObstacleKind::Wall(_) => None,
        }
    }

    pub fn as_wall(&self) -> Option<&Wall> {
        match &self.kind {
            ObstacleKind::Wall(wall) => Some(wall),
            ObstacleKind::Prop(_) => None,
        }
    }

    /// Label for menus; props without one fall back to their model path.
    pub fn display_name(&self) -> &str {
        if !self.label.is_empty() {
            return &self.label;
        }
        match &self.kind {
            ObstacleKind::Prop(prop) => &prop.model_path,
            ObstacleKind::Wall(_) => "wall",
        }
    }

    /// Point used for crosshair picking.
    pub fn anchor(&self) -> Vec3 {
        match &self.kind {
            ObstacleKind::Prop(prop) => prop.position,
            ObstacleKind::Wall(wall) => wall.center(),
        }
    }

    pub fn from_record(record: &ObstacleRecord) -> Option<Self> {
        if !record.is_loadable() {
            return None;
        }
        let kind = if record.is_wall() {
            ObstacleKind::Wall(Wall {
                first: Vec3::new(record.px, record.py, record.pz),
                second: Vec3::new(record.p2x, record.p2y, record.p2z),
                yaw: wrap_degrees(record.wyaw),
                color: Rgb::from_array(record.wc),
                rainbow: record.rainbow != 0,
            })
        } else {
            ObstacleKind::Prop(Prop {
                model_path: record.path.clone(),
                position: Vec3::new(record.px, record.py, record.pz),
                angles: Angles::new(record.ax, record.ay, record.az),
                scale: clamp_scale(record.sc),
                visible: record.iv == 0,
                tint: Rgb::from_array(record.tint),
            })
        };
        Some(Obstacle {
            label: record.label.clone(),
            kind,
        })
    }

    pub fn to_record(&self) -> ObstacleRecord {
        let mut record = ObstacleRecord {
            label: self.label.clone(),
            ..ObstacleRecord::default()
        };
        match &self.kind {
            ObstacleKind::Prop(prop) => {
                record.path = prop.model_path.clone();
                [record.px, record.py, record.pz] = prop.position.to_array();
                record.ax = prop.angles.pitch;
                record.ay = prop.angles.yaw;
                record.az = prop.angles.roll;
                record.sc = prop.scale;
                record.iv = u8::from(!prop.visible);
                record.tint = prop.tint.to_array();
            }
            ObstacleKind::Wall(wall) => {
                record.wall = 1;
                [record.px, record.py, record.pz] = wall.first.to_array();
                [record.p2x, record.p2y, record.p2z] = wall.second.to_array();
                record.wyaw = wall.yaw;
                record.wc = wall.color.to_array();
                record.rainbow = u8::from(wall.rainbow);
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wall_records_ignore_prop_keys() {
        let record = ObstacleRecord {
            label: "gate".to_string(),
            path: "models/ignored.vmdl".to_string(),
            wall: 1,
            px: 1.0,
            p2x: 9.0,
            wyaw: -90.0,
            sc: 7.0,
            rainbow: 1,
            ..ObstacleRecord::default()
        };
        let obstacle = Obstacle::from_record(&record).expect("wall loads");
        let wall = obstacle.as_wall().expect("wall kind");
        assert_eq!(wall.first, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(wall.second, Vec3::new(9.0, 0.0, 0.0));
        assert_eq!(wall.yaw, 270.0);
        assert!(wall.rainbow);
        assert_eq!(obstacle.to_record().path, "");
    }

    #[test]
    fn prop_scale_is_clamped_on_load() {
        let record = ObstacleRecord {
            path: "models/crate.vmdl".to_string(),
            sc: 400.0,
            iv: 1,
            ..ObstacleRecord::default()
        };
        let obstacle = Obstacle::from_record(&record).expect("prop loads");
        let prop = obstacle.as_prop().expect("prop kind");
        assert_eq!(prop.scale, MAX_SCALE);
        assert!(!prop.visible);
        assert_eq!(obstacle.display_name(), "models/crate.vmdl");
    }

    #[test]
    fn record_without_path_or_wall_flag_is_rejected() {
        assert!(Obstacle::from_record(&ObstacleRecord::default()).is_none());
    }

    #[test]
    fn clamp_scale_bounds() {
        assert_eq!(clamp_scale(0.0), MIN_SCALE);
        assert_eq!(clamp_scale(100.0), MAX_SCALE);
        assert_eq!(clamp_scale(f32::NAN), 1.0);
    }
}
