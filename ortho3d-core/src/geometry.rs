/// Geometry primitives and scene objects
use nalgebra::{Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices.
    ///
    /// Degenerate triangles (zero area) yield a zero vector instead of NaNs.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Two-triangle quad through four corners given in winding order.
    pub fn quad(corners: [Point3<f32>; 4]) -> Self {
        let probe = Triangle::new(
            Vertex::new(corners[0], Vector3::zeros()),
            Vertex::new(corners[1], Vector3::zeros()),
            Vertex::new(corners[2], Vector3::zeros()),
        );
        let normal = probe.calculate_normal();
        let v = corners.map(|p| Vertex::new(p, normal));

        let mut mesh = Self::with_capacity(2);
        mesh.add_triangle(Triangle::new(v[0], v[1], v[2]));
        mesh.add_triangle(Triangle::new(v[0], v[2], v[3]));
        mesh
    }
}

/// How line segments are stroked
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineStyle {
    Solid,
    /// Dash and gap lengths are in world units.
    Dashed { dash: f32, gap: f32 },
}

impl LineStyle {
    pub const CONSTRUCTION: LineStyle = LineStyle::Dashed {
        dash: 0.25,
        gap: 0.15,
    };
}

/// Drawable shape of a scene object
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Points(Vec<Point3<f32>>),
    Lines {
        segments: Vec<[Point3<f32>; 2]>,
        style: LineStyle,
    },
    /// Closed polyline; the last point connects back to the first.
    LineLoop(Vec<Point3<f32>>),
    Mesh(Mesh),
}

impl Geometry {
    pub fn point(position: Point3<f32>) -> Self {
        Geometry::Points(vec![position])
    }

    pub fn segment(a: Point3<f32>, b: Point3<f32>) -> Self {
        Geometry::Lines {
            segments: vec![[a, b]],
            style: LineStyle::Solid,
        }
    }

    pub fn dashed(segments: Vec<[Point3<f32>; 2]>) -> Self {
        Geometry::Lines {
            segments,
            style: LineStyle::CONSTRUCTION,
        }
    }

    /// Flattened segment endpoints, two vertices per segment.
    ///
    /// Dashed lines come back as their individual dashes and loops are
    /// closed, so every backend can stroke the result as plain segments.
    /// Points and meshes have no line vertices.
    pub fn line_vertices(&self) -> Vec<Point3<f32>> {
        match self {
            Geometry::Lines { segments, style } => {
                let mut out = Vec::with_capacity(segments.len() * 2);
                for [a, b] in segments {
                    match *style {
                        LineStyle::Solid => out.extend([*a, *b]),
                        LineStyle::Dashed { dash, gap } => push_dashes(&mut out, *a, *b, dash, gap),
                    }
                }
                out
            }
            Geometry::LineLoop(points) => {
                let mut out = Vec::with_capacity(points.len() * 2);
                for (i, p) in points.iter().enumerate() {
                    let next = points[(i + 1) % points.len()];
                    out.extend([*p, next]);
                }
                out
            }
            Geometry::Points(_) | Geometry::Mesh(_) => Vec::new(),
        }
    }
}

fn push_dashes(out: &mut Vec<Point3<f32>>, a: Point3<f32>, b: Point3<f32>, dash: f32, gap: f32) {
    let length = (b - a).norm();
    let period = dash + gap;
    if length <= f32::EPSILON || dash <= 0.0 || period <= 0.0 {
        out.extend([a, b]);
        return;
    }

    let dir = (b - a) / length;
    let count = (length / period).ceil() as usize;
    for i in 0..count {
        let t = i as f32 * period;
        let end = (t + dash).min(length);
        out.extend([a + dir * t, a + dir * end]);
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn hex(value: u32) -> Self {
        Self::rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
    }

    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Relative luminance in [0, 1].
    pub fn luminance(self) -> f32 {
        let [r, g, b] = self.to_f32();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

/// Surface appearance of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    /// Diameter of point markers in pixels.
    pub point_size: f32,
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            point_size: 10.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_point_size(mut self, point_size: f32) -> Self {
        self.point_size = point_size;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// One renderable primitive: exactly one geometry, at least one material.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    geometry: Geometry,
    materials: Vec<Material>,
}

impl SceneObject {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self {
            geometry,
            materials: vec![material],
        }
    }

    /// Point marker with a soft halo drawn underneath the solid dot.
    pub fn marker(position: Point3<f32>, color: Color) -> Self {
        Self::new(
            Geometry::point(position),
            Material::new(color).with_opacity(0.3).with_point_size(18.0),
        )
        .with_material(Material::new(color).with_point_size(10.0))
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.push(material);
        self
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }
}

/// Text anchored at a world position
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: Point3<f32>,
    pub color: Color,
}

impl Label {
    pub fn new(text: impl Into<String>, position: Point3<f32>, color: Color) -> Self {
        Self {
            text: text.into(),
            position,
            color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_quad_normal() {
        let mesh = Mesh::quad([
            Point3::new(-1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(-1.0, 0.0, -1.0),
        ]);
        assert_eq!(mesh.triangles.len(), 2);
        let n = mesh.triangles[0].vertices[0].normal;
        assert_relative_eq!(n, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_normal_is_zero() {
        let p = Vertex::new(Point3::origin(), Vector3::zeros());
        let t = Triangle::new(p, p, p);
        assert_eq!(t.calculate_normal(), Vector3::zeros());
    }

    #[test]
    fn test_dashed_line_splits_into_dashes() {
        let geometry = Geometry::Lines {
            segments: vec![[Point3::origin(), Point3::new(3.0, 0.0, 0.0)]],
            style: LineStyle::Dashed { dash: 0.5, gap: 0.25 },
        };
        let verts = geometry.line_vertices();
        // 3.0 / 0.75 = 4 dashes
        assert_eq!(verts.len(), 8);
        assert_relative_eq!(verts[1].x, 0.5, epsilon = 1e-6);
        assert!(verts.iter().all(|p| p.x <= 3.0 + 1e-6));
    }

    #[test]
    fn test_line_loop_is_closed() {
        let geometry = Geometry::LineLoop(vec![
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]);
        let verts = geometry.line_vertices();
        assert_eq!(verts.len(), 6);
        assert_eq!(verts[5], Point3::origin());
    }

    #[test]
    fn test_zero_length_dash_is_kept() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let verts = Geometry::dashed(vec![[p, p]]).line_vertices();
        assert_eq!(verts, vec![p, p]);
    }

    #[test]
    fn test_marker_has_two_materials() {
        let marker = SceneObject::marker(Point3::origin(), Color::hex(0xff0000));
        assert_eq!(marker.materials().len(), 2);
        assert!(marker.materials()[0].is_transparent());
    }

    #[test]
    fn test_color_hex() {
        let c = Color::hex(0x3366ff);
        assert_eq!(c, Color::rgb(0x33, 0x66, 0xff));
        assert_eq!(c.css(), "#3366ff");
    }
}
