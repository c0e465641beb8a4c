/// ASCII rasterizer implementing the render backend port
use crossterm::{
    cursor::MoveTo,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3};
use ortho3d_core::backend::{GeometryId, Lighting, MaterialId, RenderBackend, RenderFrame};
use ortho3d_core::camera::project_with;
use ortho3d_core::geometry::Color as SceneColor;
use ortho3d_core::{BackendError, Geometry, Label, Material, Triangle, Viewport};
use std::collections::HashMap;
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are about twice as tall as they are wide.
pub const CELL_ASPECT: u32 = 2;

const MARKER: char = '●';
/// Lines win depth ties with the surfaces they lie on.
const LINE_DEPTH_BIAS: f32 = 1e-4;
/// Markers stay on top of the lines that end at them.
const MARKER_DEPTH_BIAS: f32 = 1e-3;

struct Uploaded {
    geometry: Geometry,
    line_vertices: Vec<Point3<f32>>,
}

/// ASCII renderer that converts scene geometry to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    geometries: HashMap<GeometryId, Uploaded>,
    materials: HashMap<MaterialId, Material>,
    next_id: u32,
    disposed: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            geometries: HashMap::new(),
            materials: HashMap::new(),
            next_id: 0,
            disposed: false,
        }
    }

    /// Viewport to hand the scene for a grid of `cols` x `rows` cells.
    pub fn viewport_for(cols: u16, rows: u16) -> Viewport {
        Viewport::new(cols as u32, rows as u32 * CELL_ASPECT)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn live_resources(&self) -> (usize, usize) {
        (self.geometries.len(), self.materials.len())
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// The character grid as plain text lines, trailing blanks trimmed.
    pub fn to_text(&self) -> Vec<String> {
        self.char_buffer
            .chunks(self.width.max(1))
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect()
    }

    pub fn clear(&mut self) {
        for i in 0..self.depth_buffer.len() {
            self.depth_buffer[i] = f32::INFINITY;
            self.char_buffer[i] = ' ';
            self.color_buffer[i] = Color::Reset;
        }
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    /// Screen position in cells plus depth.
    fn project(&self, view_proj: &Matrix4<f32>, point: &Point3<f32>) -> Option<(f32, f32, f32)> {
        let viewport = Viewport::new(self.width as u32, self.height as u32);
        project_with(view_proj, point, viewport)
    }

    fn draw_item(&mut self, uploaded: &Uploaded, material: &Material, view_proj: &Matrix4<f32>, lighting: &Lighting) {
        match &uploaded.geometry {
            Geometry::Mesh(mesh) => {
                for triangle in &mesh.triangles {
                    self.render_triangle(triangle, material, view_proj, lighting);
                }
            }
            Geometry::Points(points) => {
                // Halos are meaningless on a character grid.
                if material.is_transparent() {
                    return;
                }
                for point in points {
                    if let Some((x, y, depth)) = self.project(view_proj, point) {
                        self.plot(x, y, depth - MARKER_DEPTH_BIAS, MARKER, material.color, true);
                    }
                }
            }
            Geometry::Lines { .. } | Geometry::LineLoop(_) => {
                for segment in uploaded.line_vertices.chunks_exact(2) {
                    self.render_segment(&segment[0], &segment[1], material, view_proj);
                }
            }
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        material: &Material,
        view_proj: &Matrix4<f32>,
        lighting: &Lighting,
    ) {
        // Project vertices to screen space
        let mut screen_coords = Vec::with_capacity(3);
        for vertex in &triangle.vertices {
            match self.project(view_proj, &vertex.position) {
                Some(coords) => screen_coords.push(coords),
                None => return, // Triangle is clipped
            }
        }

        let normal = triangle.vertices[0].normal;
        let brightness = lighting.shade(&normal) * material.opacity;

        // Map brightness to character
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.min(LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];
        if character == ' ' {
            return;
        }

        self.rasterize_triangle(&screen_coords, character, material.color, !material.is_transparent());
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32)], character: char, color: SceneColor, write_depth: bool) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor().max(0.0) as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil().min(self.width as f32 - 1.0) as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor().max(0.0) as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil().min(self.height as f32 - 1.0) as i32;

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(px, py, depth, character, color, write_depth);
                    }
                }
            }
        }
    }

    /// Bresenham between the projected endpoints, one cell per step.
    fn render_segment(&mut self, a: &Point3<f32>, b: &Point3<f32>, material: &Material, view_proj: &Matrix4<f32>) {
        let (Some(p0), Some(p1)) = (self.project(view_proj, a), self.project(view_proj, b)) else {
            return;
        };
        let character = slope_char(p1.0 - p0.0, p1.1 - p0.1);

        let (mut x, mut y) = (p0.0.floor() as i64, p0.1.floor() as i64);
        let (x1, y1) = (p1.0.floor() as i64, p1.1.floor() as i64);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        // Offscreen endpoints can be far away; cap the walk.
        let limit = (self.width + self.height) as i64 * 4;

        let mut err = dx + dy;
        for i in 0..=limit {
            let t = (i as f32 / steps).min(1.0);
            let depth = p0.2 + (p1.2 - p0.2) * t - LINE_DEPTH_BIAS;
            self.plot(x as f32 + 0.5, y as f32 + 0.5, depth, character, material.color, true);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn plot(&mut self, x: f32, y: f32, depth: f32, character: char, color: SceneColor, write_depth: bool) {
        if x < 0.0 || y < 0.0 || !(-1.0..=1.0).contains(&depth) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            if write_depth {
                self.depth_buffer[idx] = depth;
            }
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = terminal_color(color);
        }
    }

    fn render_label(&mut self, label: &Label, view_proj: &Matrix4<f32>) {
        let Some((x, y, depth)) = self.project(view_proj, &label.position) else {
            return;
        };
        if !(-1.0..=1.0).contains(&depth) || y < 0.0 || y >= self.height as f32 {
            return;
        }
        let row = y as usize;
        for (i, character) in label.text.chars().enumerate() {
            let col = x as i64 + i as i64;
            if col < 0 || col >= self.width as i64 {
                continue;
            }
            let idx = row * self.width + col as usize;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = terminal_color(label.color);
        }
    }

    /// Queue the grid at (`left`, `top`), one row per line.
    pub fn draw<W: Write>(&self, writer: &mut W, left: u16, top: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(MoveTo(left, top + y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, BackendError> {
        let id = GeometryId(self.issue());
        self.geometries.insert(
            id,
            Uploaded {
                geometry: geometry.clone(),
                line_vertices: geometry.line_vertices(),
            },
        );
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, BackendError> {
        let id = MaterialId(self.issue());
        self.materials.insert(id, *material);
        Ok(id)
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.geometries.remove(&id);
    }

    fn release_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }

    fn resize(&mut self, viewport: Viewport) {
        let width = viewport.width as usize;
        let height = (viewport.height / CELL_ASPECT) as usize;
        if width == self.width && height == self.height {
            return;
        }
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
    }

    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.clear();
        let view_proj = frame.view_projection();

        // Taken out so draw_item can borrow the buffers mutably.
        let geometries = std::mem::take(&mut self.geometries);
        for item in &frame.items {
            let Some(uploaded) = geometries.get(&item.geometry) else {
                continue;
            };
            for material_id in item.materials {
                if let Some(material) = self.materials.get(material_id).copied() {
                    self.draw_item(uploaded, &material, &view_proj, frame.lighting);
                }
            }
        }
        self.geometries = geometries;

        for label in frame.labels {
            self.render_label(label, &view_proj);
        }
    }

    fn dispose(&mut self) {
        self.geometries.clear();
        self.materials.clear();
        self.clear();
        self.disposed = true;
    }
}

/// Pick a stroke character from a screen-space direction (y down).
fn slope_char(dx: f32, dy: f32) -> char {
    if dx.abs() < f32::EPSILON && dy.abs() < f32::EPSILON {
        return '+';
    }
    let angle = (-dy).atan2(dx).to_degrees().rem_euclid(180.0);
    match angle {
        a if !(22.5..157.5).contains(&a) => '-',
        a if a < 67.5 => '/',
        a if a < 112.5 => '|',
        _ => '\\',
    }
}

fn terminal_color(color: SceneColor) -> Color {
    Color::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ortho3d_core::backend::DrawItem;
    use ortho3d_core::config::{CameraConfig, SceneConfig};
    use ortho3d_core::{Camera, Mesh, SceneObject};

    fn frame_parts(renderer: &AsciiRenderer) -> (Camera, Lighting) {
        let camera = Camera::new(
            &CameraConfig {
                position: [0.0, 0.0, 10.0],
                ..CameraConfig::default()
            },
            Viewport::new(renderer.width() as u32, renderer.height() as u32 * CELL_ASPECT),
        );
        (camera, Lighting::from_config(&SceneConfig::default()))
    }

    fn upload(renderer: &mut AsciiRenderer, object: &SceneObject) -> (GeometryId, Vec<MaterialId>) {
        let geometry = renderer.create_geometry(object.geometry()).unwrap();
        let materials = object
            .materials()
            .iter()
            .map(|m| renderer.create_material(m).unwrap())
            .collect();
        (geometry, materials)
    }

    fn render(renderer: &mut AsciiRenderer, objects: &[(GeometryId, Vec<MaterialId>)]) {
        let (camera, lighting) = frame_parts(renderer);
        let frame = RenderFrame {
            camera: &camera,
            lighting: &lighting,
            items: objects
                .iter()
                .map(|(geometry, materials)| DrawItem {
                    geometry: *geometry,
                    materials,
                })
                .collect(),
            labels: &[],
        };
        renderer.render(&frame);
    }

    fn count(renderer: &AsciiRenderer, wanted: impl Fn(char) -> bool) -> usize {
        renderer.to_text().iter().flat_map(|row| row.chars()).filter(|c| wanted(*c)).count()
    }

    #[test]
    fn test_viewport_compensates_cell_shape() {
        use approx::assert_relative_eq;
        // 80x20 cells are roughly a 2:1 rectangle on screen.
        let viewport = AsciiRenderer::viewport_for(80, 20);
        assert_relative_eq!(viewport.aspect(), 2.0);

        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.resize(viewport);
        assert_eq!((renderer.width(), renderer.height()), (80, 20));
    }

    #[test]
    fn test_release_frees_resources() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let object = SceneObject::marker(Point3::origin(), SceneColor::hex(0xff0000));
        let (geometry, materials) = upload(&mut renderer, &object);
        assert_eq!(renderer.live_resources(), (1, 2));

        renderer.release_geometry(geometry);
        for id in materials {
            renderer.release_material(id);
        }
        assert_eq!(renderer.live_resources(), (0, 0));
    }

    #[test]
    fn test_horizontal_segment_draws_dashes() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let object = SceneObject::new(
            Geometry::segment(Point3::new(-2.0, 0.0, 0.0), Point3::new(2.0, 0.0, 0.0)),
            Material::new(SceneColor::hex(0xffffff)),
        );
        let handle = upload(&mut renderer, &object);
        render(&mut renderer, &[handle]);
        assert!(count(&renderer, |c| c == '-') > 4);
        assert_eq!(count(&renderer, |c| c == '|'), 0);
    }

    #[test]
    fn test_marker_draws_dot_only() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let handle = upload(&mut renderer, &SceneObject::marker(Point3::origin(), SceneColor::hex(0xffffff)));
        render(&mut renderer, &[handle]);
        assert_eq!(count(&renderer, |c| c == MARKER), 1);
        assert_eq!(renderer.cell(20, 10), Some(MARKER));
    }

    #[test]
    fn test_opaque_quad_fills_cells() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let quad = Mesh::quad([
            Point3::new(-2.0, -2.0, 0.0),
            Point3::new(2.0, -2.0, 0.0),
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(-2.0, 2.0, 0.0),
        ]);
        let handle = upload(
            &mut renderer,
            &SceneObject::new(Geometry::Mesh(quad), Material::new(SceneColor::hex(0xffffff))),
        );
        render(&mut renderer, &[handle]);
        assert!(count(&renderer, |c| c != ' ') > 20);
    }

    #[test]
    fn test_resize_keeps_cell_aspect() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.resize(AsciiRenderer::viewport_for(80, 24));
        assert_eq!((renderer.width(), renderer.height()), (80, 24));
    }

    #[test]
    fn test_slope_chars() {
        assert_eq!(slope_char(5.0, 0.0), '-');
        assert_eq!(slope_char(0.0, -5.0), '|');
        assert_eq!(slope_char(5.0, -5.0), '/');
        assert_eq!(slope_char(5.0, 5.0), '\\');
        assert_eq!(slope_char(-5.0, 0.0), '-');
    }

    #[test]
    fn test_dispose_clears_everything() {
        let mut renderer = AsciiRenderer::new(20, 10);
        let handle = upload(&mut renderer, &SceneObject::marker(Point3::origin(), SceneColor::hex(0xffffff)));
        render(&mut renderer, &[handle]);
        renderer.dispose();
        assert_eq!(renderer.live_resources(), (0, 0));
        assert_eq!(count(&renderer, |c| c != ' '), 0);
        assert!(renderer.is_disposed());
    }
}
