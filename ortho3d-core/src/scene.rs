//! Scene lifecycle: permanent reference content plus one owned set of
//! simulation objects that topics fill and clear.

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::backend::{DrawItem, GeometryId, Lighting, MaterialId, RenderBackend, RenderFrame};
use crate::camera::{Camera, OrbitControls, Viewport};
use crate::config::{CameraConfig, SceneConfig, ViewerConfig};
use crate::error::{BackendError, SceneError};
use crate::geometry::{Color, Geometry, Label, LineStyle, Material, Mesh, SceneObject};

/// Object-safe view of the scene handed to topics
pub trait SceneSink {
    /// Take ownership of an object and draw it until the next clear.
    fn add_object(&mut self, object: SceneObject);

    /// Release every simulation object. Idempotent.
    fn clear_simulation(&mut self);

    fn active_len(&self) -> usize;
}

/// Backend resources held for one scene object
#[derive(Debug)]
struct ObjectHandle {
    geometry: GeometryId,
    materials: Vec<MaterialId>,
}

impl ObjectHandle {
    fn upload<B: RenderBackend>(backend: &mut B, object: &SceneObject) -> Result<Self, BackendError> {
        let geometry = backend.create_geometry(object.geometry())?;
        let mut materials = Vec::with_capacity(object.materials().len());
        for material in object.materials() {
            match backend.create_material(material) {
                Ok(id) => materials.push(id),
                Err(err) => {
                    // Don't leak what was already created for this object.
                    for id in materials {
                        backend.release_material(id);
                    }
                    backend.release_geometry(geometry);
                    return Err(err);
                }
            }
        }
        Ok(Self { geometry, materials })
    }

    fn release<B: RenderBackend>(self, backend: &mut B) {
        backend.release_geometry(self.geometry);
        for id in self.materials {
            backend.release_material(id);
        }
    }
}

/// Owns the render backend, camera, lighting, reference planes and the
/// active simulation objects.
pub struct SceneManager<B: RenderBackend> {
    /// `None` once torn down.
    backend: Option<B>,
    camera: Camera,
    controls: OrbitControls,
    lighting: Lighting,
    viewport: Viewport,
    permanent: Vec<ObjectHandle>,
    active: Vec<ObjectHandle>,
    labels: Vec<Label>,
    frames: u64,
}

impl<B: RenderBackend> SceneManager<B> {
    /// Install camera, lights, controls and the reference scene on a
    /// freshly created backend. The render loop counts as started once
    /// this returns; hosts drive it through [`SceneManager::frame`].
    pub fn initialize(mut backend: B, viewport: Viewport, config: &ViewerConfig) -> Result<Self, SceneError> {
        let camera = Camera::new(&config.camera, viewport);
        let controls = OrbitControls::new(&camera, &config.camera);
        backend.resize(viewport);

        let mut permanent = Vec::new();
        for object in reference_objects(&config.scene) {
            match ObjectHandle::upload(&mut backend, &object) {
                Ok(handle) => permanent.push(handle),
                Err(err) => {
                    for handle in permanent {
                        handle.release(&mut backend);
                    }
                    backend.dispose();
                    return Err(err.into());
                }
            }
        }

        info!(
            width = viewport.width,
            height = viewport.height,
            reference_objects = permanent.len(),
            "scene initialized"
        );

        Ok(Self {
            backend: Some(backend),
            camera,
            controls,
            lighting: Lighting::from_config(&config.scene),
            viewport,
            permanent,
            active: Vec::new(),
            labels: Vec::new(),
            frames: 0,
        })
    }

    pub fn is_running(&self) -> bool {
        self.backend.is_some()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn controls_mut(&mut self) -> &mut OrbitControls {
        &mut self.controls
    }

    /// Queue a pan; needs the camera for the screen-aligned axes.
    pub fn pan(&mut self, right: f32, up: f32) {
        self.controls.pan(&self.camera, right, up);
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Put the camera back where it started, dropping any queued motion.
    pub fn reset_view(&mut self, config: &CameraConfig) {
        self.camera = Camera::new(config, self.viewport);
        self.controls = OrbitControls::new(&self.camera, config);
        debug!("camera reset");
    }

    pub fn permanent_len(&self) -> usize {
        self.permanent.len()
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }

    /// Append permanent labels. Dropped if the scene was torn down.
    pub fn add_labels(&mut self, labels: impl IntoIterator<Item = Label>) {
        if !self.is_running() {
            debug!("labels arrived after teardown; dropped");
            return;
        }
        self.labels.extend(labels);
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.camera.aspect = viewport.aspect();
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(viewport);
        }
        debug!(width = viewport.width, height = viewport.height, "viewport resized");
    }

    /// One tick of the render loop: update control damping, then draw.
    ///
    /// Returns `false` once the scene has been torn down, which is the
    /// host's signal to stop scheduling frames.
    pub fn frame(&mut self) -> bool {
        let Some(backend) = self.backend.as_mut() else {
            return false;
        };

        self.controls.update(&mut self.camera);

        let items = self
            .permanent
            .iter()
            .chain(self.active.iter())
            .map(|handle| DrawItem {
                geometry: handle.geometry,
                materials: &handle.materials,
            })
            .collect();
        let frame = RenderFrame {
            camera: &self.camera,
            lighting: &self.lighting,
            items,
            labels: &self.labels,
        };
        backend.render(&frame);
        self.frames += 1;
        true
    }

    /// Upload one simulation object. Fails once the scene is torn down or
    /// when the backend rejects a resource; nothing leaks either way.
    pub fn try_add_object(&mut self, object: &SceneObject) -> Result<(), SceneError> {
        let backend = self.backend.as_mut().ok_or(SceneError::TornDown)?;
        let handle = ObjectHandle::upload(backend, object)?;
        self.active.push(handle);
        Ok(())
    }

    /// Stop rendering and release every resource. Idempotent.
    pub fn teardown(&mut self) {
        let Some(mut backend) = self.backend.take() else {
            return;
        };
        for handle in self.active.drain(..).chain(self.permanent.drain(..)) {
            handle.release(&mut backend);
        }
        self.labels.clear();
        backend.dispose();
        info!(frames = self.frames, "scene torn down");
    }
}

impl<B: RenderBackend> SceneSink for SceneManager<B> {
    fn add_object(&mut self, object: SceneObject) {
        if let Err(err) = self.try_add_object(&object) {
            warn!(%err, "scene object dropped");
        }
    }

    fn clear_simulation(&mut self) {
        if self.active.is_empty() {
            return;
        }
        let count = self.active.len();
        if let Some(backend) = self.backend.as_mut() {
            for handle in self.active.drain(..) {
                handle.release(backend);
            }
        } else {
            self.active.clear();
        }
        debug!(count, "simulation objects cleared");
    }

    fn active_len(&self) -> usize {
        self.active.len()
    }
}

impl<B: RenderBackend> Drop for SceneManager<B> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// HP and VP quads, the ground grid and the three axis lines.
pub fn reference_objects(config: &SceneConfig) -> Vec<SceneObject> {
    let e = config.plane_extent;
    let plane_material = |color: Color| Material::new(color).with_opacity(config.plane_opacity);

    let hp = Mesh::quad([
        Point3::new(-e, 0.0, e),
        Point3::new(e, 0.0, e),
        Point3::new(e, 0.0, -e),
        Point3::new(-e, 0.0, -e),
    ]);
    let vp = Mesh::quad([
        Point3::new(-e, -e, 0.0),
        Point3::new(e, -e, 0.0),
        Point3::new(e, e, 0.0),
        Point3::new(-e, e, 0.0),
    ]);

    let mut objects = vec![
        SceneObject::new(Geometry::Mesh(hp), plane_material(config.hp_color)),
        SceneObject::new(Geometry::Mesh(vp), plane_material(config.vp_color)),
        SceneObject::new(grid_geometry(config.grid_size, config.grid_divisions), Material::new(config.grid_color)),
    ];

    let l = config.axis_length;
    let axes = [
        (Point3::new(-l, 0.0, 0.0), Point3::new(l, 0.0, 0.0)),
        (Point3::new(0.0, -l, 0.0), Point3::new(0.0, l, 0.0)),
        (Point3::new(0.0, 0.0, -l), Point3::new(0.0, 0.0, l)),
    ];
    for ((a, b), color) in axes.into_iter().zip(config.axis_colors) {
        objects.push(SceneObject::new(Geometry::segment(a, b), Material::new(color)));
    }
    objects
}

/// Square grid on the HP (y = 0), centred on the origin.
fn grid_geometry(size: f32, divisions: u32) -> Geometry {
    let divisions = divisions.max(1);
    let half = size / 2.0;
    let step = size / divisions as f32;
    let mut segments = Vec::with_capacity((divisions as usize + 1) * 2);
    for i in 0..=divisions {
        let t = -half + step * i as f32;
        segments.push([Point3::new(t, 0.0, -half), Point3::new(t, 0.0, half)]);
        segments.push([Point3::new(-half, 0.0, t), Point3::new(half, 0.0, t)]);
    }
    Geometry::Lines {
        segments,
        style: LineStyle::Solid,
    }
}

/// Axis and reference-plane names placed just past the geometry.
pub fn axis_labels(config: &SceneConfig) -> Vec<Label> {
    let l = config.axis_length + 0.5;
    let e = config.plane_extent;
    let [x, y, z] = config.axis_colors;
    vec![
        Label::new("X", Point3::new(l, 0.0, 0.0), x),
        Label::new("Y", Point3::new(0.0, l, 0.0), y),
        Label::new("Z", Point3::new(0.0, 0.0, l), z),
        Label::new("HP", Point3::new(e * 0.8, 0.0, e * 0.8), config.hp_color),
        Label::new("VP", Point3::new(e * 0.8, e * 0.8, 0.0), config.vp_color),
    ]
}
