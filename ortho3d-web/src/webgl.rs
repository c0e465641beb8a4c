//! WebGL2 render backend.
//!
//! One shader program draws everything: points as round sprites, lines as
//! `LINES`, and meshes as lit triangles. Opaque materials go first, then
//! transparent ones with depth writes off.

use std::collections::HashMap;

use js_sys::Float32Array;
use ortho3d_core::backend::{DrawItem, Lighting, RenderBackend, RenderFrame};
use ortho3d_core::{BackendError, Geometry, GeometryId, Material, MaterialId, SceneError, Viewport};
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use crate::labels::LabelOverlay;

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_view_proj;
uniform float u_point_size;
out vec3 v_normal;
void main() {
    v_normal = a_normal;
    gl_Position = u_view_proj * vec4(a_position, 1.0);
    gl_PointSize = u_point_size;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_normal;
uniform vec3 u_color;
uniform float u_opacity;
uniform int u_lit;
uniform int u_round;
uniform vec3 u_ambient;
uniform vec3 u_light_color;
uniform vec3 u_light_dir;
out vec4 o;
void main() {
    if (u_round == 1) {
        vec2 c = gl_PointCoord - 0.5;
        if (dot(c, c) > 0.25) discard;
    }
    vec3 color = u_color;
    if (u_lit == 1) {
        float diffuse = abs(dot(normalize(v_normal), u_light_dir));
        color *= min(u_ambient + u_light_color * diffuse, vec3(1.0));
    }
    o = vec4(color, u_opacity);
}
"#;

/// Position and normal, interleaved.
const FLOATS_PER_VERTEX: usize = 6;
const STRIDE_BYTES: i32 = (FLOATS_PER_VERTEX * 4) as i32;
const BACKGROUND: [f32; 4] = [0.102, 0.102, 0.180, 1.0];

struct GpuGeometry {
    buffer: WebGlBuffer,
    vao: WebGlVertexArrayObject,
    mode: u32,
    count: i32,
    lit: bool,
    round: bool,
}

struct Uniforms {
    view_proj: Option<WebGlUniformLocation>,
    point_size: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    round: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    light_color: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
}

impl Uniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let loc = |name: &str| gl.get_uniform_location(program, name);
        Self {
            view_proj: loc("u_view_proj"),
            point_size: loc("u_point_size"),
            color: loc("u_color"),
            opacity: loc("u_opacity"),
            lit: loc("u_lit"),
            round: loc("u_round"),
            ambient: loc("u_ambient"),
            light_color: loc("u_light_color"),
            light_dir: loc("u_light_dir"),
        }
    }
}

pub struct WebGlBackend {
    gl: GL,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    uniforms: Uniforms,
    geometries: HashMap<GeometryId, GpuGeometry>,
    materials: HashMap<MaterialId, Material>,
    next_id: u32,
    viewport: Viewport,
    labels: Option<LabelOverlay>,
    disposed: bool,
}

impl WebGlBackend {
    /// Fails with [`SceneError::Unsupported`] when the browser has no WebGL2.
    pub fn new(canvas: HtmlCanvasElement, overlay: Option<HtmlCanvasElement>) -> Result<Self, SceneError> {
        let gl: GL = canvas
            .get_context("webgl2")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into().ok())
            .ok_or_else(|| SceneError::Unsupported("WebGL2 is not supported by this browser".to_string()))?;

        let program = link_program(&gl, VERTEX_SHADER, FRAGMENT_SHADER)?;
        let uniforms = Uniforms::locate(&gl, &program);

        let labels = overlay.and_then(|canvas| match LabelOverlay::new(canvas) {
            Ok(overlay) => Some(overlay),
            Err(err) => {
                warn!(%err, "axis label overlay unavailable");
                None
            }
        });

        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        let [r, g, b, a] = BACKGROUND;
        gl.clear_color(r, g, b, a);

        info!("WebGL2 backend ready");
        Ok(Self {
            gl,
            canvas,
            program,
            uniforms,
            geometries: HashMap::new(),
            materials: HashMap::new(),
            next_id: 0,
            viewport: Viewport::new(1, 1),
            labels,
            disposed: false,
        })
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    pub fn live_resources(&self) -> usize {
        self.geometries.len() + self.materials.len()
    }

    fn allocate_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn set_lighting(&self, lighting: &Lighting) {
        let scale = |rgb: [f32; 3], k: f32| [rgb[0] * k, rgb[1] * k, rgb[2] * k];
        let ambient = scale(lighting.ambient.to_f32(), lighting.ambient_intensity);
        let light = scale(lighting.directional.to_f32(), lighting.directional_intensity);
        let u = &self.uniforms;
        self.gl.uniform3fv_with_f32_array(u.ambient.as_ref(), &ambient);
        self.gl.uniform3fv_with_f32_array(u.light_color.as_ref(), &light);
        self.gl
            .uniform3fv_with_f32_array(u.light_dir.as_ref(), lighting.direction.as_slice());
    }

    fn draw_pass(&self, items: &[DrawItem<'_>], transparent: bool) {
        let u = &self.uniforms;
        self.gl.depth_mask(!transparent);
        for item in items {
            let Some(geometry) = self.geometries.get(&item.geometry) else {
                continue;
            };
            self.gl.bind_vertex_array(Some(&geometry.vao));
            self.gl.uniform1i(u.lit.as_ref(), i32::from(geometry.lit));
            self.gl.uniform1i(u.round.as_ref(), i32::from(geometry.round));
            for material in item.materials.iter().filter_map(|id| self.materials.get(id)) {
                if material.is_transparent() != transparent {
                    continue;
                }
                self.gl
                    .uniform3fv_with_f32_array(u.color.as_ref(), &material.color.to_f32());
                self.gl.uniform1f(u.opacity.as_ref(), material.opacity);
                self.gl.uniform1f(u.point_size.as_ref(), material.point_size);
                self.gl.draw_arrays(geometry.mode, 0, geometry.count);
            }
        }
        self.gl.depth_mask(true);
    }

    fn delete(&self, geometry: GpuGeometry) {
        self.gl.delete_buffer(Some(&geometry.buffer));
        self.gl.delete_vertex_array(Some(&geometry.vao));
    }
}

/// Interleaved vertex data, primitive mode, and whether the geometry is
/// lit or drawn as round points.
fn vertex_data(geometry: &Geometry) -> (Vec<f32>, u32, bool, bool) {
    let mut data = Vec::new();
    let mut push = |p: &nalgebra::Point3<f32>, n: &nalgebra::Vector3<f32>| {
        data.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z]);
    };
    let zero = nalgebra::Vector3::zeros();

    match geometry {
        Geometry::Points(points) => {
            points.iter().for_each(|p| push(p, &zero));
            (data, GL::POINTS, false, true)
        }
        Geometry::Lines { .. } | Geometry::LineLoop(_) => {
            geometry.line_vertices().iter().for_each(|p| push(p, &zero));
            (data, GL::LINES, false, false)
        }
        Geometry::Mesh(mesh) => {
            for triangle in &mesh.triangles {
                let normal = triangle.calculate_normal();
                for vertex in &triangle.vertices {
                    push(&vertex.position, &normal);
                }
            }
            (data, GL::TRIANGLES, true, false)
        }
    }
}

impl RenderBackend for WebGlBackend {
    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, BackendError> {
        if self.disposed {
            return Err(BackendError::Allocation("backend disposed".to_string()));
        }
        let (data, mode, lit, round) = vertex_data(geometry);
        let gl = &self.gl;

        let buffer = gl
            .create_buffer()
            .ok_or_else(|| BackendError::Allocation("vertex buffer".to_string()))?;
        let Some(vao) = gl.create_vertex_array() else {
            gl.delete_buffer(Some(&buffer));
            return Err(BackendError::Allocation("vertex array".to_string()));
        };

        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        let array = Float32Array::from(data.as_slice());
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &array, GL::STATIC_DRAW);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, STRIDE_BYTES, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_with_i32(1, 3, GL::FLOAT, false, STRIDE_BYTES, 12);
        gl.bind_vertex_array(None);
        gl.bind_buffer(GL::ARRAY_BUFFER, None);

        let id = GeometryId(self.allocate_id());
        self.geometries.insert(
            id,
            GpuGeometry {
                buffer,
                vao,
                mode,
                count: (data.len() / FLOATS_PER_VERTEX) as i32,
                lit,
                round,
            },
        );
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, BackendError> {
        if self.disposed {
            return Err(BackendError::Allocation("backend disposed".to_string()));
        }
        let id = MaterialId(self.allocate_id());
        self.materials.insert(id, *material);
        Ok(id)
    }

    fn release_geometry(&mut self, id: GeometryId) {
        if let Some(geometry) = self.geometries.remove(&id) {
            self.delete(geometry);
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        self.gl.viewport(0, 0, viewport.width as i32, viewport.height as i32);
        if let Some(labels) = &self.labels {
            labels.resize(viewport);
        }
    }

    fn render(&mut self, frame: &RenderFrame<'_>) {
        if self.disposed {
            return;
        }
        let gl = &self.gl;
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(
            self.uniforms.view_proj.as_ref(),
            false,
            frame.view_projection().as_slice(),
        );
        self.set_lighting(frame.lighting);

        self.draw_pass(&frame.items, false);
        self.draw_pass(&frame.items, true);
        gl.bind_vertex_array(None);

        if let Some(labels) = &self.labels {
            labels.draw(frame, self.viewport);
        }
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        let leaked = self.live_resources();
        for (_, geometry) in std::mem::take(&mut self.geometries) {
            self.delete(geometry);
        }
        self.materials.clear();
        self.gl.delete_program(Some(&self.program));
        if let Some(labels) = self.labels.take() {
            labels.remove();
        }
        self.canvas.remove();
        self.disposed = true;
        debug!(leaked, "WebGL2 backend disposed");
    }
}

fn compile_shader(gl: &GL, source: &str, kind: u32) -> Result<WebGlShader, BackendError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| BackendError::Allocation("shader".to_string()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(BackendError::Allocation(format!("shader compile: {log}")))
    }
}

fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram, BackendError> {
    let vert = compile_shader(gl, vertex, GL::VERTEX_SHADER)?;
    let frag = compile_shader(gl, fragment, GL::FRAGMENT_SHADER)?;
    let program = gl
        .create_program()
        .ok_or_else(|| BackendError::Allocation("shader program".to_string()))?;
    gl.attach_shader(&program, &vert);
    gl.attach_shader(&program, &frag);
    gl.link_program(&program);
    // Shaders are owned by the program once linked.
    gl.delete_shader(Some(&vert));
    gl.delete_shader(Some(&frag));

    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(BackendError::Allocation(format!("program link: {log}")))
    }
}
