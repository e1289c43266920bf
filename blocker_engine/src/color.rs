use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub const fn from_array([r, g, b]: [u8; 3]) -> Self {
        Rgb { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// Colours offered by the edit menus, keyed by the token used in menu items.
pub const PALETTE: [(&str, Rgb); 8] = [
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 96, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 128, 0)),
    ("white", Rgb::new(255, 255, 255)),
];

pub fn palette_color(name: &str) -> Option<Rgb> {
    PALETTE
        .iter()
        .find(|(token, _)| token.eq_ignore_ascii_case(name))
        .map(|(_, color)| *color)
}

/// Wraps any angle into [0, 360).
pub fn wrap_degrees(degrees: f32) -> f32 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Six-sector HSV to RGB at full saturation and value.
pub fn hue_to_rgb(hue: f32) -> Rgb {
    let h = wrap_degrees(hue) / 60.0;
    let sector = h.floor();
    let fraction = h - sector;
    let rising = channel(fraction);
    let falling = channel(1.0 - fraction);
    match sector as u8 {
        0 => Rgb::new(255, rising, 0),
        1 => Rgb::new(falling, 255, 0),
        2 => Rgb::new(0, 255, rising),
        3 => Rgb::new(0, falling, 255),
        4 => Rgb::new(rising, 0, 255),
        _ => Rgb::new(255, 0, falling),
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_sectors_hit_primaries() {
        assert_eq!(hue_to_rgb(0.0), Rgb::new(255, 0, 0));
        assert_eq!(hue_to_rgb(60.0), Rgb::new(255, 255, 0));
        assert_eq!(hue_to_rgb(120.0), Rgb::new(0, 255, 0));
        assert_eq!(hue_to_rgb(180.0), Rgb::new(0, 255, 255));
        assert_eq!(hue_to_rgb(240.0), Rgb::new(0, 0, 255));
        assert_eq!(hue_to_rgb(300.0), Rgb::new(255, 0, 255));
        assert_eq!(hue_to_rgb(360.0), hue_to_rgb(0.0));
        assert_eq!(hue_to_rgb(30.0), Rgb::new(255, 128, 0));
    }

    #[test]
    fn wrap_degrees_stays_in_range() {
        assert_eq!(wrap_degrees(370.0), 10.0);
        assert_eq!(wrap_degrees(-15.0), 345.0);
        assert_eq!(wrap_degrees(-1e-9), 0.0);
        assert_eq!(wrap_degrees(f32::NAN), 0.0);
    }

    #[test]
    fn palette_lookup_ignores_case() {
        assert_eq!(palette_color("Cyan"), Some(Rgb::new(0, 255, 255)));
        assert_eq!(palette_color("mauve"), None);
    }
}
