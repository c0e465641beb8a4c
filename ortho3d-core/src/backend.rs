//! Render backend port.
//!
//! The scene manager owns *what* is drawn; a backend owns the GPU (or
//! terminal, or in-memory) resources that draw it. Every resource a
//! backend hands out is released exactly once through the matching
//! `release_*` call.

use nalgebra::{Matrix4, Vector3};

use crate::camera::{Camera, Viewport};
use crate::config::SceneConfig;
use crate::error::BackendError;
use crate::geometry::{Color, Geometry, Label, Material};

/// Backend-issued handle for an uploaded geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(pub u32);

/// Backend-issued handle for an uploaded material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub u32);

/// Ambient plus one directional light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: Color,
    pub ambient_intensity: f32,
    pub directional: Color,
    pub directional_intensity: f32,
    /// Unit vector pointing from the scene towards the light.
    pub direction: Vector3<f32>,
}

impl Lighting {
    pub fn from_config(config: &SceneConfig) -> Self {
        let [x, y, z] = config.directional.position;
        Self {
            ambient: config.ambient.color,
            ambient_intensity: config.ambient.intensity,
            directional: config.directional.color,
            directional_intensity: config.directional.intensity,
            direction: Vector3::new(x, y, z).try_normalize(1e-6).unwrap_or_else(Vector3::y),
        }
    }

    /// Brightness factor for a surface with the given normal.
    ///
    /// Two-sided: back faces are lit like front faces.
    pub fn shade(&self, normal: &Vector3<f32>) -> f32 {
        let diffuse = normal.dot(&self.direction).abs();
        (self.ambient_intensity + self.directional_intensity * diffuse).min(1.0)
    }
}

/// One object to draw: its geometry once per material, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem<'a> {
    pub geometry: GeometryId,
    pub materials: &'a [MaterialId],
}

/// Everything a backend needs for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame<'a> {
    pub camera: &'a Camera,
    pub lighting: &'a Lighting,
    /// Permanent scene content first, then simulation objects.
    pub items: Vec<DrawItem<'a>>,
    pub labels: &'a [Label],
}

impl RenderFrame<'_> {
    pub fn view_projection(&self) -> Matrix4<f32> {
        self.camera.view_projection()
    }
}

pub trait RenderBackend {
    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, BackendError>;

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, BackendError>;

    fn release_geometry(&mut self, id: GeometryId);

    fn release_material(&mut self, id: MaterialId);

    fn resize(&mut self, viewport: Viewport);

    fn render(&mut self, frame: &RenderFrame<'_>);

    /// Free backend-wide resources and detach the output surface.
    fn dispose(&mut self);
}
