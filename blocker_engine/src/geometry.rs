use glam::Vec3;
use serde::Serialize;

use crate::color::{hue_to_rgb, wrap_degrees, Rgb};

pub const MIN_HALF_EXTENT: f32 = 1.0;
pub const WIREFRAME_SEGMENTS: usize = 24;

/// Yaw within this many degrees of a quarter turn is treated as axis-aligned.
const QUARTER_TURN_TOLERANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Angles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Angles {
    pub const fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Angles { pitch, yaw, roll }
    }
}

/// Collision box derived from two wall corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxVolume {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub axis_aligned: bool,
    /// Rotation the host must apply; zero for axis-aligned boxes.
    pub yaw: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec3,
    pub end: Vec3,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WirePaint {
    Solid(Rgb),
    Rainbow { hue: f32 },
}

impl WirePaint {
    pub fn color(self) -> Rgb {
        match self {
            WirePaint::Solid(color) => color,
            WirePaint::Rainbow { hue } => hue_to_rgb(hue),
        }
    }
}

/// Corner `i` takes max on x when bit 0 is set, y for bit 1 and z for bit 2.
const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (2, 3),
    (4, 5),
    (6, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

const FACE_DIAGONALS: [(usize, usize); 12] = [
    (0, 3),
    (1, 2),
    (4, 7),
    (5, 6),
    (0, 5),
    (1, 4),
    (2, 7),
    (3, 6),
    (0, 6),
    (2, 4),
    (1, 7),
    (3, 5),
];

/// Derives the collision box for a wall.
///
/// Near 0/90/180/270 degrees the box stays axis-aligned and, for the odd
/// quarter turns, the X/Y half-extents are swapped so the footprint follows
/// the rotated frame. Any other yaw yields an oriented box. Every half-extent
/// is floored at [`MIN_HALF_EXTENT`].
pub fn derive_box(p1: Vec3, p2: Vec3, yaw_degrees: f32) -> BoxVolume {
    let yaw = wrap_degrees(yaw_degrees);
    let center = (p1 + p2) * 0.5;
    let half_extents = ((p2 - p1).abs() * 0.5).max(Vec3::splat(MIN_HALF_EXTENT));

    match quarter_turns(yaw) {
        Some(turns) => {
            let half_extents = if turns % 2 == 1 {
                Vec3::new(half_extents.y, half_extents.x, half_extents.z)
            } else {
                half_extents
            };
            BoxVolume {
                center,
                half_extents,
                axis_aligned: true,
                yaw: 0.0,
            }
        }
        None => BoxVolume {
            center,
            half_extents,
            axis_aligned: false,
            yaw,
        },
    }
}

fn quarter_turns(yaw: f32) -> Option<u8> {
    (0..=4u8)
        .find(|turn| (yaw - f32::from(*turn) * 90.0).abs() <= QUARTER_TURN_TOLERANCE)
        .map(|turn| turn % 4)
}

pub fn box_corners(p1: Vec3, p2: Vec3) -> [Vec3; 8] {
    let min = p1.min(p2);
    let max = p1.max(p2);
    std::array::from_fn(|i| {
        Vec3::new(
            if i & 1 == 0 { min.x } else { max.x },
            if i & 2 == 0 { min.y } else { max.y },
            if i & 4 == 0 { min.z } else { max.z },
        )
    })
}

/// Rotates `point` about the vertical axis through `pivot`.
pub fn rotate_yaw_about(point: Vec3, pivot: Vec3, yaw_degrees: f32) -> Vec3 {
    let (sin, cos) = yaw_degrees.to_radians().sin_cos();
    let dx = point.x - pivot.x;
    let dy = point.y - pivot.y;
    Vec3::new(
        pivot.x + dx * cos - dy * sin,
        pivot.y + dx * sin + dy * cos,
        point.z,
    )
}

/// The 12 edges of the p1/p2 box followed by two diagonals per face, so thin
/// walls stay visible from every side.
pub fn generate_wireframe(
    p1: Vec3,
    p2: Vec3,
    paint: WirePaint,
    yaw_degrees: f32,
) -> [Segment; WIREFRAME_SEGMENTS] {
    let mut corners = box_corners(p1, p2);
    let yaw = wrap_degrees(yaw_degrees);
    if yaw != 0.0 {
        let pivot = (p1 + p2) * 0.5;
        for corner in &mut corners {
            *corner = rotate_yaw_about(*corner, pivot, yaw);
        }
    }

    let color = paint.color();
    let mut segments = [Segment {
        start: Vec3::ZERO,
        end: Vec3::ZERO,
        color,
    }; WIREFRAME_SEGMENTS];
    for (segment, (a, b)) in segments
        .iter_mut()
        .zip(BOX_EDGES.iter().chain(FACE_DIAGONALS.iter()))
    {
        segment.start = corners[*a];
        segment.end = corners[*b];
    }
    segments
}
