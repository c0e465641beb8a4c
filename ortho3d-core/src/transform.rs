/// Orientation of the plane figure, as set by its three rotation sliders
use nalgebra::{Point3, Rotation3, Vector3};

/// Rotations about the world X, Y and Z axes, applied in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    rotation: Rotation3<f32>,
}

impl RotationState {
    pub fn zero() -> Self {
        Self {
            rotation: Rotation3::identity(),
        }
    }

    /// Angles in degrees, the unit the sliders use.
    pub fn from_degrees(x: f32, y: f32, z: f32) -> Self {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z.to_radians());
        Self { rotation: rz * ry * rx }
    }

    /// Rotate a point about the origin
    pub fn apply(&self, point: &Point3<f32>) -> Point3<f32> {
        self.rotation * point
    }

    pub fn apply_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * vector
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_rotation_keeps_points_exact() {
        let p = Point3::new(2.5, -2.5, 0.0);
        assert_eq!(RotationState::zero().apply(&p), p);
        assert_eq!(RotationState::from_degrees(0.0, 0.0, 0.0).apply(&p), p);
    }

    #[test]
    fn test_x_applied_before_z() {
        // X by 90° takes +Y to +Z; Z by 90° then leaves +Z alone.
        let rotation = RotationState::from_degrees(90.0, 0.0, 90.0);
        let p = rotation.apply(&Point3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_vectors_keep_length() {
        let rotation = RotationState::from_degrees(30.0, -45.0, 60.0);
        let v = rotation.apply_vector(&Vector3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(v.norm(), Vector3::new(1.0f32, 2.0, 3.0).norm(), epsilon = 1e-5);
    }
}
