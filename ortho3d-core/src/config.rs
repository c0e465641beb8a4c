//! Viewer configuration.
//!
//! Every field has a default, so a config file only needs to name the
//! values it changes.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geometry::Color;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub camera: CameraConfig,
    pub scene: SceneConfig,
    /// Topic loaded right after start-up.
    pub default_topic: String,
    /// Below this width the navigation drawer auto-closes.
    pub narrow_viewport_px: u32,
    /// Typeface for axis labels in the web host.
    pub label_font_url: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            scene: SceneConfig::default(),
            default_topic: "welcome".to_string(),
            narrow_viewport_px: 768,
            label_font_url: "assets/fonts/axis-labels.woff2".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_deg: f32,
    pub position: [f32; 3],
    pub near: f32,
    pub far: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of pending orbit motion applied per frame.
    pub damping: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_deg: 60.0,
            position: [12.0, 9.0, 14.0],
            near: 0.1,
            far: 1000.0,
            min_distance: 5.0,
            max_distance: 50.0,
            damping: 0.08,
            rotate_speed: 0.005,
            zoom_speed: 0.001,
            pan_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Half the side of the HP/VP quads.
    pub plane_extent: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
    pub axis_length: f32,
    pub hp_color: Color,
    pub vp_color: Color,
    pub plane_opacity: f32,
    pub grid_color: Color,
    pub axis_colors: [Color; 3],
    pub ambient: LightConfig,
    pub directional: DirectionalLightConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            plane_extent: 10.0,
            grid_size: 20.0,
            grid_divisions: 20,
            axis_length: 12.0,
            hp_color: Color::hex(0x4caf50),
            vp_color: Color::hex(0x2196f3),
            plane_opacity: 0.25,
            grid_color: Color::hex(0x444444),
            axis_colors: [Color::hex(0xff4444), Color::hex(0x44ff44), Color::hex(0x4488ff)],
            ambient: LightConfig::default(),
            directional: DirectionalLightConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: Color::hex(0xffffff),
            intensity: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: Color,
    pub intensity: f32,
    /// Position of the light; it shines towards the origin.
    pub position: [f32; 3],
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: Color::hex(0xffffff),
            intensity: 0.8,
            position: [10.0, 20.0, 10.0],
        }
    }
}
