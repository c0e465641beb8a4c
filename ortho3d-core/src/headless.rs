//! In-memory implementations of the render and UI ports.
//!
//! Nothing is drawn; resources are tracked so callers can check what is
//! live, and panels are kept so their text can be printed.

use std::collections::BTreeMap;

use crate::backend::{GeometryId, MaterialId, RenderBackend, RenderFrame};
use crate::camera::Viewport;
use crate::error::BackendError;
use crate::geometry::{Geometry, Material};
use crate::ui::{Panel, TopicButton, UiSurface};

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    geometries: BTreeMap<GeometryId, Geometry>,
    materials: BTreeMap<MaterialId, Material>,
    next_id: u32,
    materials_created: usize,
    material_budget: Option<usize>,
    viewport: Option<Viewport>,
    frames: u64,
    last_draw_count: usize,
    disposed: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make material creation fail once `count` materials have been created
    /// in total. Used to exercise allocation failure paths.
    pub fn fail_materials_after(&mut self, count: usize) {
        self.material_budget = Some(count);
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    /// Geometries in creation order.
    pub fn geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.geometries.values()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_draw_count(&self) -> usize {
        self.last_draw_count
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or(Viewport::new(0, 0))
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn issue(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_geometry(&mut self, geometry: &Geometry) -> Result<GeometryId, BackendError> {
        let id = GeometryId(self.issue());
        self.geometries.insert(id, geometry.clone());
        Ok(id)
    }

    fn create_material(&mut self, material: &Material) -> Result<MaterialId, BackendError> {
        if self.material_budget.is_some_and(|budget| self.materials_created >= budget) {
            return Err(BackendError::Allocation("material budget exhausted".to_string()));
        }
        let id = MaterialId(self.issue());
        self.materials.insert(id, *material);
        self.materials_created += 1;
        Ok(id)
    }

    fn release_geometry(&mut self, id: GeometryId) {
        self.geometries.remove(&id);
    }

    fn release_material(&mut self, id: MaterialId) {
        self.materials.remove(&id);
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn render(&mut self, frame: &RenderFrame<'_>) {
        self.frames += 1;
        self.last_draw_count = frame.items.len();
    }

    fn dispose(&mut self) {
        self.geometries.clear();
        self.materials.clear();
        self.disposed = true;
    }
}

/// UI surface that remembers the last state of every region
#[derive(Debug, Default, Clone)]
pub struct HeadlessUi {
    pub buttons: Vec<TopicButton>,
    pub active_button: Option<String>,
    pub controls: Option<Panel>,
    pub info: Option<Panel>,
    pub loading: bool,
    pub fatal_error: Option<String>,
}

impl HeadlessUi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a readout in the info panel, by label.
    pub fn readout(&self, label: &str) -> Option<&str> {
        self.info.as_ref()?.readout_value(label)
    }
}

impl UiSurface for HeadlessUi {
    fn render_topic_buttons(&mut self, topics: &[TopicButton]) {
        self.buttons = topics.to_vec();
    }

    fn set_active_button(&mut self, id: &str) {
        self.active_button = Some(id.to_string());
    }

    fn set_controls(&mut self, panel: &Panel) {
        self.controls = Some(panel.clone());
    }

    fn clear_controls(&mut self) {
        self.controls = None;
    }

    fn set_info(&mut self, panel: &Panel) {
        self.info = Some(panel.clone());
    }

    fn show_loading(&mut self) {
        self.loading = true;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn show_fatal_error(&mut self, message: &str) {
        self.loading = true;
        self.fatal_error = Some(message.to_string());
    }
}
