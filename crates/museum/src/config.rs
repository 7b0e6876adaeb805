//! Museum layout and controller tuning, loaded from TOML.
//!
//! Every section uses `#[serde(default)]` so a file that only overrides
//! `[controller]` still gets the built-in room and lighting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const BUILTIN: &str = include_str!("../assets/museum.toml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid museum file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("the catalog has no exhibits")]
    NoExhibits,

    #[error("exhibit #{0} has an empty title")]
    EmptyTitle(usize),

    #[error("exhibit \"{0}\" must have a positive size")]
    NonPositiveSize(String),

    #[error("{field} must be {expected}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuseumConfig {
    pub title: String,
    pub controller: ControllerConfig,
    pub camera: CameraConfig,
    pub room: RoomConfig,
    pub light: LightConfig,
    pub exhibits: Vec<ExhibitConfig>,
}

impl Default for MuseumConfig {
    fn default() -> Self {
        Self {
            title: String::from("Mathaf"),
            controller: ControllerConfig::default(),
            camera: CameraConfig::default(),
            room: RoomConfig::default(),
            light: LightConfig::default(),
            exhibits: Vec::new(),
        }
    }
}

/// Look, walk and picking parameters of the first-person controller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Radians of rotation per dragged pixel
    pub look_sensitivity: f32,
    /// Walking speed in units per second
    pub move_speed: f32,
    pub max_pitch_degrees: f32,
    /// Furthest an exhibit can be and still be hovered
    pub pick_distance: f32,
    /// Pointer travel below which a press and release count as a click
    pub click_threshold_px: f32,
    pub eye_height: f32,
    /// Floor position (x, z) the visitor starts at
    pub start_position: [f32; 2],
    pub start_yaw_degrees: f32,
    /// Emissive colour written to the hovered exhibit
    pub highlight_color: [f32; 3],
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            look_sensitivity: 0.003,
            move_speed: 4.0,
            max_pitch_degrees: 85.0,
            pick_distance: 8.0,
            click_threshold_px: 5.0,
            eye_height: 1.6,
            start_position: [0.0, 7.0],
            start_yaw_degrees: 0.0,
            highlight_color: [0.35, 0.28, 0.08],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy_degrees: 60.0,
            znear: 0.05,
            zfar: 200.0,
        }
    }
}

/// Single hall centred on the origin, floor at y = 0
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoomConfig {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub floor_color: [f32; 3],
    pub wall_color: [f32; 3],
    pub ceiling_color: [f32; 3],
    pub pedestal_height: f32,
    pub pedestal_color: [f32; 3],
    pub background: [f32; 3],
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            width: 16.0,
            depth: 20.0,
            height: 4.5,
            floor_color: [0.42, 0.3, 0.2],
            wall_color: [0.86, 0.8, 0.68],
            ceiling_color: [0.55, 0.5, 0.44],
            pedestal_height: 1.0,
            pedestal_color: [0.93, 0.91, 0.86],
            background: [0.02, 0.02, 0.03],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    /// Direction the light travels in
    pub direction: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub ambient: [f32; 3],
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            direction: [-0.3, -1.0, -0.4],
            color: [1.0, 0.96, 0.88],
            intensity: 0.9,
            ambient: [0.3, 0.28, 0.26],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShapeConfig {
    Box { size: [f32; 3] },
    Sphere { radius: f32 },
}

impl ShapeConfig {
    /// Extent below the centre, used to rest the piece on its pedestal
    pub fn half_height(&self) -> f32 {
        match *self {
            ShapeConfig::Box { size } => size[1] / 2.0,
            ShapeConfig::Sphere { radius } => radius,
        }
    }

    fn is_positive(&self) -> bool {
        match *self {
            ShapeConfig::Box { size } => size.iter().all(|s| *s > 0.0),
            ShapeConfig::Sphere { radius } => radius > 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExhibitConfig {
    pub title: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub era: String,
    #[serde(default)]
    pub description: String,
    /// Floor position (x, z)
    pub position: [f32; 2],
    pub shape: ShapeConfig,
    #[serde(default = "default_exhibit_color")]
    pub color: [f32; 3],
    #[serde(default)]
    pub emissive: [f32; 3],
    #[serde(default = "default_true")]
    pub pedestal: bool,
    /// Extra lift above the floor or pedestal top
    #[serde(default)]
    pub elevation: f32,
}

fn default_exhibit_color() -> [f32; 3] {
    [0.7, 0.55, 0.3]
}

fn default_true() -> bool {
    true
}

fn check(ok: bool, field: &'static str, expected: &'static str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, expected })
    }
}

impl MuseumConfig {
    /// The catalog shipped with the binary
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::parse(BUILTIN)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let controller = &self.controller;
        check(
            controller.look_sensitivity > 0.0,
            "controller.look_sensitivity",
            "positive",
        )?;
        check(
            controller.move_speed >= 0.0,
            "controller.move_speed",
            "zero or positive",
        )?;
        check(
            controller.max_pitch_degrees > 0.0 && controller.max_pitch_degrees < 90.0,
            "controller.max_pitch_degrees",
            "between 0 and 90",
        )?;
        check(
            controller.pick_distance > 0.0,
            "controller.pick_distance",
            "positive",
        )?;
        check(
            controller.click_threshold_px > 0.0,
            "controller.click_threshold_px",
            "positive",
        )?;

        let camera = &self.camera;
        check(
            camera.fovy_degrees > 0.0 && camera.fovy_degrees < 180.0,
            "camera.fovy_degrees",
            "between 0 and 180",
        )?;
        check(camera.znear > 0.0, "camera.znear", "positive")?;
        check(camera.zfar > camera.znear, "camera.zfar", "greater than znear")?;

        let room = &self.room;
        check(
            room.width > 0.0 && room.depth > 0.0 && room.height > 0.0,
            "room",
            "positive in every dimension",
        )?;
        check(
            controller.eye_height > 0.0 && controller.eye_height < room.height,
            "controller.eye_height",
            "between the floor and the ceiling",
        )?;

        if self.exhibits.is_empty() {
            return Err(ConfigError::NoExhibits);
        }

        for (index, exhibit) in self.exhibits.iter().enumerate() {
            if exhibit.title.trim().is_empty() {
                return Err(ConfigError::EmptyTitle(index));
            }
            if !exhibit.shape.is_positive() {
                return Err(ConfigError::NonPositiveSize(exhibit.title.clone()));
            }

            let [x, z] = exhibit.position;
            if x.abs() > room.width / 2.0 || z.abs() > room.depth / 2.0 {
                log::warn!("Exhibit \"{}\" stands outside the room", exhibit.title);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[[exhibits]]
title = "Dallah"
position = [0.0, -2.0]
shape = { kind = "sphere", radius = 0.3 }
"#;

    #[test]
    fn builtin_catalog_is_valid() {
        let config = MuseumConfig::builtin().unwrap();
        assert!(config.exhibits.len() >= 5);
        assert_eq!(config.controller.max_pitch_degrees, 85.0);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = MuseumConfig::parse(MINIMAL).unwrap();

        assert_eq!(config.controller, ControllerConfig::default());
        assert_eq!(config.room, RoomConfig::default());
        assert_eq!(config.exhibits[0].color, default_exhibit_color());
        assert!(config.exhibits[0].pedestal);
        assert_eq!(config.exhibits[0].era, "");
    }

    #[test]
    fn overriding_one_controller_field_keeps_the_rest() {
        let content = format!("[controller]\nmove_speed = 2.5\n{MINIMAL}");
        let config = MuseumConfig::parse(&content).unwrap();

        assert_eq!(config.controller.move_speed, 2.5);
        assert_eq!(config.controller.look_sensitivity, 0.003);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            MuseumConfig::parse("title = \"Empty\""),
            Err(ConfigError::NoExhibits)
        ));
    }

    #[test]
    fn blank_title_is_rejected() {
        let content = MINIMAL.replace("\"Dallah\"", "\"  \"");
        assert!(matches!(
            MuseumConfig::parse(&content),
            Err(ConfigError::EmptyTitle(0))
        ));
    }

    #[test]
    fn zero_sized_shape_is_rejected() {
        let content = MINIMAL.replace("radius = 0.3", "radius = 0.0");
        assert!(matches!(
            MuseumConfig::parse(&content),
            Err(ConfigError::NonPositiveSize(title)) if title == "Dallah"
        ));
    }

    #[test]
    fn pitch_limit_must_stay_below_vertical() {
        let content = format!("[controller]\nmax_pitch_degrees = 90.0\n{MINIMAL}");
        assert!(matches!(
            MuseumConfig::parse(&content),
            Err(ConfigError::OutOfRange {
                field: "controller.max_pitch_degrees",
                ..
            })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            MuseumConfig::parse("[[exhibits]\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_reports_its_path() {
        let error = MuseumConfig::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(error.to_string().contains("does/not/exist.toml"));
    }
}
