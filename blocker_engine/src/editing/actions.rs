//! Per-obstacle edit tokens and the pure definition changes they cause.

use std::str::FromStr;

use glam::Vec3;
use thiserror::Error;

use crate::color::{palette_color, wrap_degrees, Rgb};
use crate::obstacle::{clamp_scale, Obstacle, ObstacleKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateAxis {
    Pitch,
    Yaw,
    Roll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

impl FromStr for Axis {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            other => Err(ParseActionError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditAction {
    Rotate { axis: RotateAxis, degrees: f32 },
    Scale(f32),
    ScaleReset,
    Visible(bool),
    Tint(Rgb),
    WireColor(Rgb),
    Rainbow(bool),
    Nudge { axis: Axis, distance: f32 },
    Resize { axis: Axis, distance: f32 },
    MoveToCrosshair,
    MoveToPing,
    Save,
    Delete,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognised edit token `{0}`")]
pub struct ParseActionError(pub String);

fn number(raw: &str, token: &str) -> Result<f32, ParseActionError> {
    raw.parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseActionError(token.to_string()))
}

fn toggle(raw: &str, token: &str) -> Result<bool, ParseActionError> {
    match raw {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(ParseActionError(token.to_string())),
    }
}

impl FromStr for EditAction {
    type Err = ParseActionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let bad = || ParseActionError(token.to_string());
        let parts: Vec<&str> = token.split(':').collect();
        let action = match parts.as_slice() {
            ["yaw", value] => EditAction::Rotate {
                axis: RotateAxis::Yaw,
                degrees: number(value, token)?,
            },
            ["pitch", value] => EditAction::Rotate {
                axis: RotateAxis::Pitch,
                degrees: number(value, token)?,
            },
            ["roll", value] => EditAction::Rotate {
                axis: RotateAxis::Roll,
                degrees: number(value, token)?,
            },
            ["scale", "reset"] => EditAction::ScaleReset,
            ["scale", value] => EditAction::Scale(number(value, token)?),
            ["vis", value] => EditAction::Visible(toggle(value, token)?),
            ["tint", name] => EditAction::Tint(palette_color(name).ok_or_else(bad)?),
            ["color", name] => EditAction::WireColor(palette_color(name).ok_or_else(bad)?),
            ["rainbow", value] => EditAction::Rainbow(toggle(value, token)?),
            ["nudge", axis, value] => EditAction::Nudge {
                axis: axis.parse().map_err(|_| bad())?,
                distance: number(value, token)?,
            },
            ["size", axis, value] => EditAction::Resize {
                axis: axis.parse().map_err(|_| bad())?,
                distance: number(value, token)?,
            },
            ["move", "trace"] => EditAction::MoveToCrosshair,
            ["move", "ping"] => EditAction::MoveToPing,
            ["save"] => EditAction::Save,
            ["delete"] => EditAction::Delete,
            ["back"] => EditAction::Back,
            _ => return Err(bad()),
        };
        Ok(action)
    }
}

/// How the live instance has to follow a definition change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    /// Prop moved or rotated; teleport in place.
    Transform,
    Scale(f32),
    Visibility(bool),
    Tint(Rgb),
    WireColor(Rgb),
    Rainbow(bool),
    /// Wall corners or yaw changed; respawn.
    Geometry,
}

/// Applies a definition-only action. Actions that need the host (moves to a
/// point, save, delete, back) and actions that do not fit the obstacle kind
/// return `None` and leave the obstacle untouched.
pub fn edit_definition(obstacle: &mut Obstacle, action: &EditAction) -> Option<Change> {
    match (&mut obstacle.kind, *action) {
        (ObstacleKind::Prop(prop), EditAction::Rotate { axis, degrees }) => {
            match axis {
                RotateAxis::Pitch => prop.angles.pitch += degrees,
                RotateAxis::Yaw => prop.angles.yaw += degrees,
                RotateAxis::Roll => prop.angles.roll += degrees,
            }
            Some(Change::Transform)
        }
        (
            ObstacleKind::Wall(wall),
            EditAction::Rotate {
                axis: RotateAxis::Yaw,
                degrees,
            },
        ) => {
            wall.yaw = wrap_degrees(wall.yaw + degrees);
            Some(Change::Geometry)
        }
        (ObstacleKind::Prop(prop), EditAction::Scale(delta)) => {
            prop.scale = round_scale(clamp_scale(prop.scale + delta));
            Some(Change::Scale(prop.scale))
        }
        (ObstacleKind::Prop(prop), EditAction::ScaleReset) => {
            prop.scale = 1.0;
            Some(Change::Scale(1.0))
        }
        (ObstacleKind::Prop(prop), EditAction::Visible(visible)) => {
            prop.visible = visible;
            Some(Change::Visibility(visible))
        }
        (ObstacleKind::Prop(prop), EditAction::Tint(color)) => {
            prop.tint = color;
            Some(Change::Tint(color))
        }
        (ObstacleKind::Wall(wall), EditAction::WireColor(color)) => {
            wall.color = color;
            Some(Change::WireColor(color))
        }
        (ObstacleKind::Wall(wall), EditAction::Rainbow(rainbow)) => {
            wall.rainbow = rainbow;
            Some(Change::Rainbow(rainbow))
        }
        (ObstacleKind::Prop(prop), EditAction::Nudge { axis, distance }) => {
            prop.position += axis.unit() * distance;
            Some(Change::Transform)
        }
        (ObstacleKind::Wall(wall), EditAction::Nudge { axis, distance }) => {
            wall.translate(axis.unit() * distance);
            Some(Change::Geometry)
        }
        (ObstacleKind::Wall(wall), EditAction::Resize { axis, distance }) => {
            // the second corner moves away from the first along the axis
            let unit = axis.unit();
            let direction = if (wall.second - wall.first).dot(unit) < 0.0 {
                -1.0
            } else {
                1.0
            };
            wall.second += unit * distance * direction;
            Some(Change::Geometry)
        }
        _ => None,
    }
}

/// Point a move-to action puts the obstacle at: props take the point, walls
/// shift both corners by `point - first`.
pub fn relocate(obstacle: &mut Obstacle, point: Vec3) -> Change {
    match &mut obstacle.kind {
        ObstacleKind::Prop(prop) => {
            prop.position = point;
            Change::Transform
        }
        ObstacleKind::Wall(wall) => {
            let offset = point - wall.first;
            wall.translate(offset);
            Change::Geometry
        }
    }
}

/// Strips accumulated float noise from repeated fractional steps.
fn round_scale(scale: f32) -> f32 {
    (scale * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::MAX_SCALE;

    fn prop() -> Obstacle {
        Obstacle::prop("crate", "models/crate.vmdl", Vec3::ZERO)
    }

    fn apply(obstacle: &mut Obstacle, token: &str) -> Option<Change> {
        let action: EditAction = token.parse().expect("valid token");
        edit_definition(obstacle, &action)
    }

    #[test]
    fn parses_the_token_grammar() {
        assert_eq!(
            "yaw:-15".parse::<EditAction>(),
            Ok(EditAction::Rotate {
                axis: RotateAxis::Yaw,
                degrees: -15.0
            })
        );
        assert_eq!("scale:+0.50".parse::<EditAction>(), Ok(EditAction::Scale(0.5)));
        assert_eq!(
            "nudge:z:-8".parse::<EditAction>(),
            Ok(EditAction::Nudge {
                axis: Axis::Z,
                distance: -8.0
            })
        );
        assert_eq!(
            "color:orange".parse::<EditAction>(),
            Ok(EditAction::WireColor(Rgb::new(255, 128, 0)))
        );
        for bad in ["", "yaw", "yaw:abc", "scale:inf", "vis:maybe", "nudge:w:8", "tint:plaid", "move:warp"] {
            assert!(bad.parse::<EditAction>().is_err(), "{bad}");
        }
    }

    #[test]
    fn scale_steps_accumulate_and_clamp() {
        let mut obstacle = prop();
        for _ in 0..5 {
            apply(&mut obstacle, "scale:+0.10");
        }
        let scale = obstacle.as_prop().map(|p| p.scale).unwrap_or_default();
        assert!((scale - 1.5).abs() < 1e-6, "scale {scale}");

        assert_eq!(apply(&mut obstacle, "scale:+100"), Some(Change::Scale(MAX_SCALE)));
        assert_eq!(apply(&mut obstacle, "scale:reset"), Some(Change::Scale(1.0)));
    }

    #[test]
    fn kind_mismatches_are_ignored() {
        let mut wall = Obstacle::wall("w", Vec3::ZERO, Vec3::ONE);
        let before = wall.clone();
        for token in ["scale:+0.10", "vis:off", "tint:blue", "pitch:+5", "roll:-5"] {
            assert_eq!(apply(&mut wall, token), None, "{token}");
        }
        assert_eq!(wall, before);

        let mut door = prop();
        let before = door.clone();
        for token in ["color:blue", "rainbow:on", "size:x:+8", "save", "delete", "move:ping"] {
            assert_eq!(apply(&mut door, token), None, "{token}");
        }
        assert_eq!(door, before);
    }

    #[test]
    fn wall_yaw_wraps_and_respawns() {
        let mut wall = Obstacle::wall("w", Vec3::ZERO, Vec3::ONE);
        assert_eq!(apply(&mut wall, "yaw:-15"), Some(Change::Geometry));
        assert_eq!(wall.as_wall().map(|w| w.yaw), Some(345.0));
    }

    #[test]
    fn resize_extends_away_from_first_corner() {
        let mut wall = Obstacle::wall("w", Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 5.0, 5.0));
        apply(&mut wall, "size:x:+8");
        apply(&mut wall, "size:y:+8");
        let shape = wall.as_wall().cloned().expect("wall");
        assert_eq!(shape.first, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(shape.second, Vec3::new(-8.0, 13.0, 5.0));
    }

    #[test]
    fn relocating_a_wall_keeps_its_shape() {
        let mut wall = Obstacle::wall("w", Vec3::new(1.0, 1.0, 0.0), Vec3::new(4.0, 2.0, 8.0));
        assert_eq!(relocate(&mut wall, Vec3::new(100.0, 0.0, 0.0)), Change::Geometry);
        let shape = wall.as_wall().cloned().expect("wall");
        assert_eq!(shape.first, Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(shape.second, Vec3::new(103.0, 1.0, 8.0));
    }
}
