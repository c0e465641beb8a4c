//! Orthographic projections onto the two reference planes.
//!
//! Coordinates: `x` runs along the XY line, `y` is height above the HP
//! (the plane `y = 0`) and `z` is distance in front of the VP (the plane
//! `z = 0`).

use std::fmt;

use nalgebra::{Point3, Vector3};

use crate::transform::RotationState;

/// Below this magnitude a coordinate counts as lying on a reference plane.
pub const PLANE_EPSILON: f32 = 1e-5;

/// Projection onto the VP: depth zeroed.
pub fn front_view(p: &Point3<f32>) -> Point3<f32> {
    Point3::new(p.x, p.y, 0.0)
}

/// Projection onto the HP: height zeroed.
pub fn top_view(p: &Point3<f32>) -> Point3<f32> {
    Point3::new(p.x, 0.0, p.z)
}

/// Where the projectors of both views meet the XY line.
pub fn xy_foot(p: &Point3<f32>) -> Point3<f32> {
    Point3::new(p.x, 0.0, 0.0)
}

/// The two fixed projection planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePlane {
    /// `y = 0`
    Horizontal,
    /// `z = 0`
    Vertical,
}

impl ReferencePlane {
    /// Signed distance of a point from this plane.
    pub fn distance(self, p: &Point3<f32>) -> f32 {
        match self {
            ReferencePlane::Horizontal => p.y,
            ReferencePlane::Vertical => p.z,
        }
    }

    fn snap(self, mut p: Point3<f32>) -> Point3<f32> {
        match self {
            ReferencePlane::Horizontal => p.y = 0.0,
            ReferencePlane::Vertical => p.z = 0.0,
        }
        p
    }

    pub fn normal(self) -> Vector3<f32> {
        match self {
            ReferencePlane::Horizontal => Vector3::y(),
            ReferencePlane::Vertical => Vector3::z(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// Above HP, in front of VP
    First,
    /// Above HP, behind VP
    Second,
    /// Below HP, behind VP
    Third,
    /// Below HP, in front of VP
    Fourth,
}

/// Where a point sits relative to the reference planes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Quadrant(Quadrant),
    /// Height is zero, depth is not.
    InHp,
    /// Depth is zero, height is not.
    InVp,
    OnXyLine,
}

impl PointLocation {
    /// Classify purely by the signs of height `y` and depth `z`.
    pub fn classify(y: f32, z: f32) -> Self {
        match (y, z) {
            (y, z) if y == 0.0 && z == 0.0 => PointLocation::OnXyLine,
            (y, _) if y == 0.0 => PointLocation::InHp,
            (_, z) if z == 0.0 => PointLocation::InVp,
            (y, z) if y > 0.0 && z > 0.0 => PointLocation::Quadrant(Quadrant::First),
            (y, _) if y > 0.0 => PointLocation::Quadrant(Quadrant::Second),
            (_, z) if z < 0.0 => PointLocation::Quadrant(Quadrant::Third),
            _ => PointLocation::Quadrant(Quadrant::Fourth),
        }
    }

    pub fn quadrant(self) -> Option<Quadrant> {
        match self {
            PointLocation::Quadrant(q) => Some(q),
            _ => None,
        }
    }
}

impl fmt::Display for PointLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            PointLocation::Quadrant(Quadrant::First) => "1st Quadrant",
            PointLocation::Quadrant(Quadrant::Second) => "2nd Quadrant",
            PointLocation::Quadrant(Quadrant::Third) => "3rd Quadrant",
            PointLocation::Quadrant(Quadrant::Fourth) => "4th Quadrant",
            PointLocation::InHp => "In HP",
            PointLocation::InVp => "In VP",
            PointLocation::OnXyLine => "On XY line",
        };
        f.write_str(text)
    }
}

/// A point and both of its views
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointProjection {
    pub point: Point3<f32>,
    pub front: Point3<f32>,
    pub top: Point3<f32>,
    pub foot: Point3<f32>,
    pub location: PointLocation,
}

impl PointProjection {
    pub fn of(point: Point3<f32>) -> Self {
        Self {
            point,
            front: front_view(&point),
            top: top_view(&point),
            foot: xy_foot(&point),
            location: PointLocation::classify(point.y, point.z),
        }
    }

    pub fn height_above_hp(&self) -> f32 {
        self.point.y.abs()
    }

    pub fn distance_from_vp(&self) -> f32 {
        self.point.z.abs()
    }
}

/// A segment placed by start point, length and its inclinations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineProjection {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub front: [Point3<f32>; 2],
    pub top: [Point3<f32>; 2],
}

impl LineProjection {
    /// `theta_deg` is the angle with the HP, `phi_deg` the angle with the VP.
    pub fn from_start(start: Point3<f32>, length: f32, theta_deg: f32, phi_deg: f32) -> Self {
        let end = start + line_direction(theta_deg, phi_deg) * length;
        Self {
            start,
            end,
            front: [front_view(&start), front_view(&end)],
            top: [top_view(&start), top_view(&end)],
        }
    }

    pub fn delta(&self) -> Vector3<f32> {
        self.end - self.start
    }

    /// Length of the segment in space.
    pub fn true_length(&self) -> f32 {
        self.delta().norm()
    }

    pub fn front_view_length(&self) -> f32 {
        let d = self.delta();
        (d.x * d.x + d.y * d.y).sqrt()
    }

    pub fn top_view_length(&self) -> f32 {
        let d = self.delta();
        (d.x * d.x + d.z * d.z).sqrt()
    }

    /// Apparent angle of the front view with the XY line, degrees.
    pub fn front_view_inclination(&self) -> f32 {
        let d = self.delta();
        d.y.atan2(d.x).to_degrees()
    }

    /// Apparent angle of the top view with the XY line, degrees.
    pub fn top_view_inclination(&self) -> f32 {
        let d = self.delta();
        d.z.atan2(d.x).to_degrees()
    }
}

/// Unit direction `(cosθ·cosφ, sinθ, cosθ·sinφ)` for angles in degrees.
pub fn line_direction(theta_deg: f32, phi_deg: f32) -> Vector3<f32> {
    let (sin_t, cos_t) = theta_deg.to_radians().sin_cos();
    let (sin_p, cos_p) = phi_deg.to_radians().sin_cos();
    Vector3::new(cos_t * cos_p, sin_t, cos_t * sin_p)
}

/// Intersection of a finite planar figure with a reference plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Trace {
    Misses,
    Touches(Point3<f32>),
    Segment(Point3<f32>, Point3<f32>),
    /// The figure lies in the reference plane.
    Coplanar,
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trace::Misses => f.write_str("does not reach the plane"),
            Trace::Touches(p) => write!(f, "touches at {}", fmt_point(p)),
            Trace::Segment(a, b) => write!(f, "{} to {}", fmt_point(a), fmt_point(b)),
            Trace::Coplanar => f.write_str("lies in the plane"),
        }
    }
}

/// A square of side `size` centred on the origin in the `z = 0` plane,
/// rotated about X, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFigure {
    /// Counter-clockwise, starting bottom-left before rotation.
    pub corners: [Point3<f32>; 4],
    pub normal: Vector3<f32>,
}

impl PlaneFigure {
    pub fn square(size: f32, rotation: &RotationState) -> Self {
        let h = size / 2.0;
        let corners = [
            Point3::new(-h, -h, 0.0),
            Point3::new(h, -h, 0.0),
            Point3::new(h, h, 0.0),
            Point3::new(-h, h, 0.0),
        ]
        .map(|p| rotation.apply(&p));
        let normal = rotation.apply_vector(&Vector3::z());
        Self { corners, normal }
    }

    pub fn trace(&self, plane: ReferencePlane) -> Trace {
        polygon_trace(&self.corners, plane)
    }

    /// Angle between this plane and a reference plane, degrees.
    pub fn inclination(&self, plane: ReferencePlane) -> f32 {
        let cos = self
            .normal
            .try_normalize(1e-6)
            .map_or(1.0, |n| n.dot(&plane.normal()).abs());
        cos.clamp(0.0, 1.0).acos().to_degrees()
    }
}

/// Clip a convex polygon's boundary against a reference plane.
pub fn polygon_trace(corners: &[Point3<f32>], plane: ReferencePlane) -> Trace {
    let distances: Vec<f32> = corners.iter().map(|p| plane.distance(p)).collect();
    if distances.iter().all(|d| d.abs() < PLANE_EPSILON) {
        return Trace::Coplanar;
    }

    let mut hits: Vec<Point3<f32>> = Vec::new();
    let mut push = |p: Point3<f32>| {
        let p = plane.snap(p);
        if !hits.iter().any(|h| (h - p).norm() < PLANE_EPSILON) {
            hits.push(p);
        }
    };

    for i in 0..corners.len() {
        let j = (i + 1) % corners.len();
        let (a, b) = (corners[i], corners[j]);
        let (da, db) = (distances[i], distances[j]);
        if da.abs() < PLANE_EPSILON {
            push(a);
        }
        let crosses = (da > PLANE_EPSILON && db < -PLANE_EPSILON) || (da < -PLANE_EPSILON && db > PLANE_EPSILON);
        if crosses {
            push(a + (b - a) * (da / (da - db)));
        }
    }

    match hits.as_slice() {
        [] => Trace::Misses,
        [p] => Trace::Touches(*p),
        _ => {
            // Convex figure: the trace spans the two farthest hits.
            let mut best = (hits[0], hits[1]);
            for (i, a) in hits.iter().enumerate() {
                for b in &hits[i + 1..] {
                    if (b - a).norm() > (best.1 - best.0).norm() {
                        best = (*a, *b);
                    }
                }
            }
            Trace::Segment(best.0, best.1)
        }
    }
}

/// `(x, y, z)` with two decimals
pub fn fmt_point(p: &Point3<f32>) -> String {
    format!("({:.2}, {:.2}, {:.2})", p.x, p.y, p.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_point_views() {
        let proj = PointProjection::of(Point3::new(3.0, 4.0, 5.0));
        assert_eq!(proj.front, Point3::new(3.0, 4.0, 0.0));
        assert_eq!(proj.top, Point3::new(3.0, 0.0, 5.0));
        assert_eq!(proj.foot, Point3::new(3.0, 0.0, 0.0));
        assert_eq!(proj.location.to_string(), "1st Quadrant");
    }

    #[test]
    fn test_quadrant_partitions() {
        let q = PointLocation::Quadrant;
        assert_eq!(PointLocation::classify(1.0, 1.0), q(Quadrant::First));
        assert_eq!(PointLocation::classify(1.0, -1.0), q(Quadrant::Second));
        assert_eq!(PointLocation::classify(-1.0, -1.0), q(Quadrant::Third));
        assert_eq!(PointLocation::classify(-1.0, 1.0), q(Quadrant::Fourth));
        assert_eq!(PointLocation::classify(0.0, 2.0), PointLocation::InHp);
        assert_eq!(PointLocation::classify(2.0, 0.0), PointLocation::InVp);
        assert_eq!(PointLocation::classify(0.0, 0.0), PointLocation::OnXyLine);
        assert_eq!(PointLocation::classify(-0.0, -3.0), PointLocation::InHp);
    }

    #[test]
    fn test_boundaries_are_not_quadrants() {
        for (y, z) in [(0.0, 1.0), (0.0, -1.0), (1.0, 0.0), (-1.0, 0.0), (0.0, 0.0)] {
            assert!(PointLocation::classify(y, z).quadrant().is_none(), "({y}, {z})");
        }
    }

    #[test]
    fn test_line_endpoint() {
        let line = LineProjection::from_start(Point3::new(2.0, 2.0, 1.0), 6.0, 30.0, 45.0);
        let c30 = 30f32.to_radians().cos();
        let c45 = 45f32.to_radians().cos();
        assert_relative_eq!(line.end.x, 2.0 + 6.0 * c30 * c45, epsilon = 1e-5);
        assert_relative_eq!(line.end.y, 5.0, epsilon = 1e-5);
        assert_relative_eq!(line.end.z, 1.0 + 6.0 * c30 * c45, epsilon = 1e-5);
        assert_relative_eq!(line.end.x, 5.67, epsilon = 0.01);
        assert_relative_eq!(line.end.z, 4.67, epsilon = 0.01);
        assert_relative_eq!(line.true_length(), 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_line_views_drop_one_coordinate() {
        let line = LineProjection::from_start(Point3::new(1.0, 2.0, 3.0), 4.0, 20.0, 35.0);
        assert_eq!(line.front[0].z, 0.0);
        assert_eq!(line.front[1].z, 0.0);
        assert_eq!(line.top[0].y, 0.0);
        assert_eq!(line.top[1].y, 0.0);
        assert_eq!(line.front[1].y, line.end.y);
        assert_eq!(line.top[1].z, line.end.z);
    }

    #[test]
    fn test_line_parallel_to_both_planes() {
        let line = LineProjection::from_start(Point3::origin(), 5.0, 0.0, 0.0);
        assert_relative_eq!(line.front_view_length(), 5.0, epsilon = 1e-6);
        assert_relative_eq!(line.top_view_length(), 5.0, epsilon = 1e-6);
        assert_relative_eq!(line.front_view_inclination(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_length_line_is_degenerate_not_an_error() {
        let line = LineProjection::from_start(Point3::new(1.0, 1.0, 1.0), 0.0, 45.0, 45.0);
        assert_eq!(line.start, line.end);
        assert_eq!(line.true_length(), 0.0);
    }

    #[test]
    fn test_unrotated_square_corners_are_exact() {
        let plane = PlaneFigure::square(5.0, &RotationState::zero());
        assert_eq!(
            plane.corners,
            [
                Point3::new(-2.5, -2.5, 0.0),
                Point3::new(2.5, -2.5, 0.0),
                Point3::new(2.5, 2.5, 0.0),
                Point3::new(-2.5, 2.5, 0.0),
            ]
        );
    }

    #[test]
    fn test_unrotated_square_traces() {
        let plane = PlaneFigure::square(5.0, &RotationState::zero());
        assert_eq!(plane.trace(ReferencePlane::Vertical), Trace::Coplanar);
        match plane.trace(ReferencePlane::Horizontal) {
            Trace::Segment(a, b) => {
                assert_relative_eq!((b - a).norm(), 5.0, epsilon = 1e-5);
                assert_eq!(a.y, 0.0);
                assert_eq!(b.y, 0.0);
            }
            other => panic!("unexpected trace {other:?}"),
        }
        assert_relative_eq!(plane.inclination(ReferencePlane::Vertical), 0.0, epsilon = 1e-4);
        assert_relative_eq!(plane.inclination(ReferencePlane::Horizontal), 90.0, epsilon = 1e-4);
    }

    #[test]
    fn test_square_lying_in_hp() {
        let plane = PlaneFigure::square(4.0, &RotationState::from_degrees(90.0, 0.0, 0.0));
        assert_eq!(plane.trace(ReferencePlane::Horizontal), Trace::Coplanar);
        match plane.trace(ReferencePlane::Vertical) {
            Trace::Segment(a, b) => assert_relative_eq!((b - a).norm(), 4.0, epsilon = 1e-4),
            other => panic!("unexpected trace {other:?}"),
        }
    }

    #[test]
    fn test_trace_touching_a_corner() {
        // Diamond resting on the HP by one corner.
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
        ];
        assert_eq!(
            polygon_trace(&corners, ReferencePlane::Horizontal),
            Trace::Touches(Point3::origin())
        );
    }

    #[test]
    fn test_trace_missing_the_plane() {
        let corners = [
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ];
        assert_eq!(polygon_trace(&corners, ReferencePlane::Horizontal), Trace::Misses);
    }

    #[test]
    fn test_zero_size_square_is_coplanar_with_both() {
        let plane = PlaneFigure::square(0.0, &RotationState::from_degrees(10.0, 20.0, 30.0));
        assert_eq!(plane.trace(ReferencePlane::Horizontal), Trace::Coplanar);
        assert_eq!(plane.trace(ReferencePlane::Vertical), Trace::Coplanar);
    }
}
