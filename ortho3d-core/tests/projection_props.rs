use nalgebra::Point3;
use proptest::prelude::*;

use ortho3d_core::projection::{PlaneFigure, PointLocation, PointProjection, Quadrant, ReferencePlane, Trace};
use ortho3d_core::{LineProjection, RotationState};

/// Slider positions: -10..=10 in steps of 0.5.
fn coordinate() -> impl Strategy<Value = f32> {
    (-20i32..=20).prop_map(|n| n as f32 * 0.5)
}

proptest! {
    #[test]
    fn point_views_zero_one_coordinate(x in coordinate(), y in coordinate(), z in coordinate()) {
        let proj = PointProjection::of(Point3::new(x, y, z));
        prop_assert_eq!(proj.front, Point3::new(x, y, 0.0));
        prop_assert_eq!(proj.top, Point3::new(x, 0.0, z));
    }

    #[test]
    fn quadrant_depends_only_on_signs(y in coordinate(), z in coordinate(), scale in 0.1f32..10.0) {
        let location = PointLocation::classify(y, z);
        prop_assert_eq!(location, PointLocation::classify(y * scale, z * scale));

        let expected = match (y.partial_cmp(&0.0), z.partial_cmp(&0.0)) {
            (Some(std::cmp::Ordering::Greater), Some(std::cmp::Ordering::Greater)) => Some(Quadrant::First),
            (Some(std::cmp::Ordering::Greater), Some(std::cmp::Ordering::Less)) => Some(Quadrant::Second),
            (Some(std::cmp::Ordering::Less), Some(std::cmp::Ordering::Less)) => Some(Quadrant::Third),
            (Some(std::cmp::Ordering::Less), Some(std::cmp::Ordering::Greater)) => Some(Quadrant::Fourth),
            _ => None,
        };
        prop_assert_eq!(location.quadrant(), expected);
    }

    #[test]
    fn line_end_follows_direction(
        x in coordinate(), y in coordinate(), z in coordinate(),
        steps in 0u32..=30,
        theta in 0u32..=90,
        phi in 0u32..=90,
    ) {
        let length = steps as f32 * 0.5;
        let (theta, phi) = (theta as f32, phi as f32);
        let line = LineProjection::from_start(Point3::new(x, y, z), length, theta, phi);

        let (t, p) = (theta.to_radians(), phi.to_radians());
        let expected = Point3::new(
            x + length * t.cos() * p.cos(),
            y + length * t.sin(),
            z + length * t.cos() * p.sin(),
        );
        prop_assert!((line.end - expected).norm() < 1e-4);
        prop_assert!((line.true_length() - (line.end - line.start).norm()).abs() < 1e-6);
        prop_assert!((line.true_length() - length).abs() < 1e-4);
    }

    #[test]
    fn plane_corners_keep_their_distance(
        size in 0u32..=24,
        rx in -90i32..=90,
        ry in -90i32..=90,
        rz in -90i32..=90,
    ) {
        let size = size as f32 * 0.5;
        let plane = PlaneFigure::square(size, &RotationState::from_degrees(rx as f32, ry as f32, rz as f32));
        let half_diagonal = size / 2.0 * std::f32::consts::SQRT_2;
        for corner in plane.corners {
            prop_assert!(((corner - Point3::origin()).norm() - half_diagonal).abs() < 1e-4);
        }
    }

    #[test]
    fn plane_traces_lie_in_their_plane(
        rx in -90i32..=90,
        ry in -90i32..=90,
        rz in -90i32..=90,
    ) {
        let plane = PlaneFigure::square(5.0, &RotationState::from_degrees(rx as f32, ry as f32, rz as f32));
        for reference in [ReferencePlane::Horizontal, ReferencePlane::Vertical] {
            match plane.trace(reference) {
                Trace::Segment(a, b) => {
                    prop_assert_eq!(reference.distance(&a), 0.0);
                    prop_assert_eq!(reference.distance(&b), 0.0);
                }
                Trace::Touches(p) => prop_assert_eq!(reference.distance(&p), 0.0),
                Trace::Misses | Trace::Coplanar => {}
            }
        }
    }
}
