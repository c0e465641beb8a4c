/// Perspective camera and damped orbit controls
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use std::f32::consts::PI;

use crate::config::CameraConfig;

/// Drawable surface size in pixels (or character cells)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Camera configuration for 3D rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &CameraConfig, viewport: Viewport) -> Self {
        let [x, y, z] = config.position;
        Self {
            position: Point3::new(x, y, z),
            target: Point3::origin(),
            up: Vector3::y(),
            fov: config.fov_deg.to_radians(),
            aspect: viewport.aspect(),
            near: config.near,
            far: config.far,
        }
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }

    /// Project a world point to screen space.
    ///
    /// Returns `(x, y, depth)` with the origin in the top-left corner and
    /// depth in normalized device units, or `None` for points behind the
    /// camera. Points outside the viewport are still returned so callers
    /// can clip partially visible lines.
    pub fn project_to_screen(&self, point: &Point3<f32>, viewport: Viewport) -> Option<(f32, f32, f32)> {
        project_with(&self.view_projection(), point, viewport)
    }
}

/// Same as [`Camera::project_to_screen`] with a precomputed view-projection
/// matrix, for per-vertex loops.
pub fn project_with(
    view_proj: &Matrix4<f32>,
    point: &Point3<f32>,
    viewport: Viewport,
) -> Option<(f32, f32, f32)> {
    let clip = view_proj * Vector4::new(point.x, point.y, point.z, 1.0);

    // Prevent division by near-zero depth values
    if clip.w < 1e-6 {
        return None;
    }

    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    let depth = clip.z / clip.w;

    let screen_x = (ndc_x + 1.0) * 0.5 * viewport.width as f32;
    let screen_y = (1.0 - ndc_y) * 0.5 * viewport.height as f32;

    Some((screen_x, screen_y, depth))
}

/// Orbit/pan/zoom around a target with exponential damping.
///
/// Input methods only accumulate deltas; [`OrbitControls::update`] applies
/// a `damping` fraction of the pending motion each frame and decays the
/// rest, so motion eases out after the input stops.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    /// Azimuth around +Y, measured from +Z
    theta: f32,
    /// Polar angle from +Y
    phi: f32,
    radius: f32,
    target: Point3<f32>,
    pending_theta: f32,
    pending_phi: f32,
    pending_zoom: f32,
    pending_pan: Vector3<f32>,
    damping: f32,
    min_distance: f32,
    max_distance: f32,
}

const POLAR_EPSILON: f32 = 1e-3;
const SETTLE_EPSILON: f32 = 1e-5;

impl OrbitControls {
    pub fn new(camera: &Camera, config: &CameraConfig) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.norm().max(f32::EPSILON);
        Self {
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
            radius,
            target: camera.target,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_zoom: 0.0,
            pending_pan: Vector3::zeros(),
            damping: config.damping.clamp(0.01, 1.0),
            min_distance: config.min_distance,
            max_distance: config.max_distance.max(config.min_distance),
        }
    }

    /// Queue an orbit by the given azimuth/polar deltas (radians).
    pub fn rotate(&mut self, d_theta: f32, d_phi: f32) {
        self.pending_theta += d_theta;
        self.pending_phi += d_phi;
    }

    /// Queue a zoom; positive values move closer. `0.1` shrinks the
    /// orbit radius by roughly 10% once fully applied.
    pub fn zoom(&mut self, amount: f32) {
        self.pending_zoom += amount;
    }

    /// Queue a pan in screen-aligned units (right, up).
    pub fn pan(&mut self, camera: &Camera, right: f32, up: f32) {
        let forward = (camera.target - camera.position).normalize();
        let side = forward.cross(&camera.up).try_normalize(1e-6).unwrap_or_else(Vector3::x);
        let cam_up = side.cross(&forward);
        let scale = self.radius * 0.1;
        self.pending_pan += side * (right * scale) + cam_up * (up * scale);
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_settled(&self) -> bool {
        self.pending_theta.abs() < SETTLE_EPSILON
            && self.pending_phi.abs() < SETTLE_EPSILON
            && self.pending_zoom.abs() < SETTLE_EPSILON
            && self.pending_pan.norm() < SETTLE_EPSILON
    }

    /// Advance damping by one frame and write the result into `camera`.
    ///
    /// Returns `true` when the camera moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let k = self.damping;

        self.theta += self.pending_theta * k;
        self.phi = (self.phi + self.pending_phi * k).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * (1.0 - self.pending_zoom * k))
            .clamp(self.min_distance, self.max_distance);
        self.target += self.pending_pan * k;

        self.pending_theta *= 1.0 - k;
        self.pending_phi *= 1.0 - k;
        self.pending_zoom *= 1.0 - k;
        self.pending_pan *= 1.0 - k;
        if self.is_settled() {
            self.pending_theta = 0.0;
            self.pending_phi = 0.0;
            self.pending_zoom = 0.0;
            self.pending_pan = Vector3::zeros();
        }

        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        let offset = Vector3::new(
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
            self.radius * sin_phi * cos_theta,
        );

        let position = self.target + offset;
        let moved = (position - camera.position).norm() > SETTLE_EPSILON
            || (self.target - camera.target).norm() > SETTLE_EPSILON;
        camera.position = position;
        camera.target = self.target;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> (Camera, CameraConfig) {
        let config = CameraConfig::default();
        (Camera::new(&config, Viewport::new(800, 600)), config)
    }

    #[test]
    fn test_camera_creation() {
        let (camera, _) = camera();
        assert!((camera.aspect - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn test_view_matrix() {
        let (camera, _) = camera();
        let view = camera.view_matrix();
        // View matrix should be non-zero
        assert!(view.norm() > 0.0);
    }

    #[test]
    fn test_zero_height_viewport_aspect() {
        assert_eq!(Viewport::new(640, 0).aspect(), 1.0);
    }

    #[test]
    fn test_target_projects_to_viewport_centre() {
        let (camera, _) = camera();
        let viewport = Viewport::new(800, 600);
        let (x, y, _) = camera.project_to_screen(&camera.target, viewport).unwrap();
        assert_relative_eq!(x, 400.0, epsilon = 1e-2);
        assert_relative_eq!(y, 300.0, epsilon = 1e-2);
    }

    #[test]
    fn test_point_behind_camera_is_rejected() {
        let (camera, _) = camera();
        let behind = camera.position + (camera.position - camera.target);
        assert!(camera.project_to_screen(&behind, Viewport::new(800, 600)).is_none());
    }

    #[test]
    fn test_controls_preserve_initial_pose() {
        let (mut camera, config) = camera();
        let before = camera.position;
        let mut controls = OrbitControls::new(&camera, &config);
        controls.update(&mut camera);
        assert_relative_eq!(camera.position, before, epsilon = 1e-4);
    }

    #[test]
    fn test_damped_rotation_converges() {
        let (mut camera, config) = camera();
        let mut controls = OrbitControls::new(&camera, &config);
        let start = camera.position;
        controls.rotate(0.5, 0.0);

        let first = {
            controls.update(&mut camera);
            camera.position
        };
        assert!((first - start).norm() > 0.0);

        for _ in 0..2000 {
            controls.update(&mut camera);
        }
        assert!(controls.is_settled());
        assert!(!controls.update(&mut camera));
        // Orbiting keeps the distance to the target.
        assert_relative_eq!((camera.position - camera.target).norm(), controls.radius(), epsilon = 1e-3);
    }

    #[test]
    fn test_zoom_respects_distance_limits() {
        let (mut camera, config) = camera();
        let mut controls = OrbitControls::new(&camera, &config);
        controls.zoom(1000.0);
        for _ in 0..100 {
            controls.update(&mut camera);
        }
        assert_relative_eq!(controls.radius(), config.min_distance, epsilon = 1e-4);

        controls.zoom(-1000.0);
        for _ in 0..100 {
            controls.update(&mut camera);
        }
        assert_relative_eq!(controls.radius(), config.max_distance, epsilon = 1e-4);
    }

    #[test]
    fn test_polar_angle_never_flips() {
        let (mut camera, config) = camera();
        let mut controls = OrbitControls::new(&camera, &config);
        controls.rotate(0.0, -50.0);
        for _ in 0..500 {
            controls.update(&mut camera);
        }
        // Camera stays above the target, never exactly on the pole.
        assert!(camera.position.y > camera.target.y);
        assert!((camera.position.x - camera.target.x).abs() + (camera.position.z - camera.target.z).abs() > 0.0);
    }
}
