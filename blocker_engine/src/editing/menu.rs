use serde::Serialize;

use crate::color::PALETTE;
use crate::obstacle::{Obstacle, ObstacleKind};

/// Degrees per wall rotate step.
pub const ROTATE_STEP: f32 = 15.0;
pub const SCALE_STEPS: [f32; 2] = [0.1, 0.5];
/// World units per nudge or resize step.
pub const NUDGE_STEP: f32 = 8.0;

/// Which screen a menu shows. Selections echo it back so the engine can
/// discard picks from a menu that no longer matches the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "index", rename_all = "snake_case")]
pub enum MenuId {
    Main,
    ModelPicker,
    ObstacleList,
    EditObstacle(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    /// Token handed back on selection.
    pub key: String,
    pub text: String,
    pub enabled: bool,
}

impl MenuItem {
    fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        MenuItem {
            key: key.into(),
            text: text.into(),
            enabled: true,
        }
    }

    fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Menu {
    pub id: MenuId,
    pub title: String,
    pub items: Vec<MenuItem>,
    /// Screen the host's back button leads to.
    pub back: Option<MenuId>,
}

impl Menu {
    pub fn item(&self, key: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.key.as_str())
    }
}

pub const MAIN_PLACE: &str = "place";
pub const MAIN_WALL: &str = "wall";
pub const MAIN_EDIT: &str = "edit";

pub fn main_menu(zone: Option<&str>, obstacle_count: usize) -> Menu {
    let title = match zone {
        Some(zone) => format!("Blockers [{zone}]"),
        None => "Blockers".to_string(),
    };
    let mut edit = MenuItem::new(MAIN_EDIT, format!("Edit obstacles ({obstacle_count})"));
    if obstacle_count == 0 {
        edit = edit.disabled();
    }
    Menu {
        id: MenuId::Main,
        title,
        items: vec![
            MenuItem::new(MAIN_PLACE, "Place prop"),
            MenuItem::new(MAIN_WALL, "Create wall"),
            edit,
        ],
        back: None,
    }
}

/// One `m:<i>` item per catalog entry.
pub fn model_menu<'a>(labels: impl IntoIterator<Item = &'a str>) -> Menu {
    Menu {
        id: MenuId::ModelPicker,
        title: "Place prop".to_string(),
        items: labels
            .into_iter()
            .enumerate()
            .map(|(i, label)| MenuItem::new(format!("m:{i}"), label))
            .collect(),
        back: Some(MenuId::Main),
    }
}

pub fn list_menu<'a>(obstacles: impl IntoIterator<Item = &'a Obstacle>) -> Menu {
    Menu {
        id: MenuId::ObstacleList,
        title: "Edit obstacles".to_string(),
        items: obstacles
            .into_iter()
            .enumerate()
            .map(|(i, obstacle)| {
                let kind = if obstacle.is_wall() { "wall" } else { "prop" };
                MenuItem::new(
                    format!("e:{i}"),
                    format!("#{i} {} ({kind})", obstacle.display_name()),
                )
            })
            .collect(),
        back: Some(MenuId::Main),
    }
}

pub fn edit_menu(index: usize, obstacle: &Obstacle) -> Menu {
    let mut items = Vec::new();
    match &obstacle.kind {
        ObstacleKind::Prop(prop) => {
            for (axis, steps) in [
                ("yaw", &[15.0, 5.0, 1.0][..]),
                ("pitch", &[5.0][..]),
                ("roll", &[5.0][..]),
            ] {
                for step in steps {
                    items.push(MenuItem::new(format!("{axis}:+{step}"), format!("+ {axis} {step}")));
                    items.push(MenuItem::new(format!("{axis}:-{step}"), format!("- {axis} {step}")));
                }
            }
            for step in SCALE_STEPS {
                items.push(MenuItem::new(
                    format!("scale:+{step:.2}"),
                    format!("+ size {step:.2}x"),
                ));
                items.push(MenuItem::new(
                    format!("scale:-{step:.2}"),
                    format!("- size {step:.2}x"),
                ));
            }
            items.push(MenuItem::new("scale:reset", "Reset size (1.0x)"));
            items.push(if prop.visible {
                MenuItem::new("vis:off", "Hide model")
            } else {
                MenuItem::new("vis:on", "Show model")
            });
            for (name, _) in PALETTE {
                items.push(MenuItem::new(format!("tint:{name}"), format!("Tint {name}")));
            }
        }
        ObstacleKind::Wall(wall) => {
            items.push(MenuItem::new(
                format!("yaw:+{ROTATE_STEP}"),
                format!("yaw +{ROTATE_STEP} ({:.0})", wall.yaw),
            ));
            items.push(MenuItem::new(
                format!("yaw:-{ROTATE_STEP}"),
                format!("yaw -{ROTATE_STEP}"),
            ));
            for axis in ["x", "y", "z"] {
                items.push(MenuItem::new(
                    format!("size:{axis}:+{NUDGE_STEP}"),
                    format!("Grow {axis}"),
                ));
                items.push(MenuItem::new(
                    format!("size:{axis}:-{NUDGE_STEP}"),
                    format!("Shrink {axis}"),
                ));
            }
            items.push(if wall.rainbow {
                MenuItem::new("rainbow:off", "Rainbow off")
            } else {
                MenuItem::new("rainbow:on", "Rainbow on")
            });
            for (name, _) in PALETTE {
                items.push(MenuItem::new(format!("color:{name}"), format!("Color {name}")));
            }
        }
    }
    for axis in ["x", "y", "z"] {
        items.push(MenuItem::new(
            format!("nudge:{axis}:+{NUDGE_STEP}"),
            format!("Move {axis} +{NUDGE_STEP}"),
        ));
        items.push(MenuItem::new(
            format!("nudge:{axis}:-{NUDGE_STEP}"),
            format!("Move {axis} -{NUDGE_STEP}"),
        ));
    }
    items.push(MenuItem::new("move:trace", "Move to crosshair"));
    items.push(MenuItem::new("move:ping", "Move to ping"));
    items.push(MenuItem::new("save", "Save"));
    items.push(MenuItem::new("delete", "Delete"));
    items.push(MenuItem::new("back", "Back"));

    Menu {
        id: MenuId::EditObstacle(index),
        title: match obstacle.as_prop() {
            Some(prop) => format!("#{index} {}  {{{:.2}x}}", obstacle.display_name(), prop.scale),
            None => format!("#{index} {}", obstacle.display_name()),
        },
        items,
        back: Some(MenuId::ObstacleList),
    }
}
