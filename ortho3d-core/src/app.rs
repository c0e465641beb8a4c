//! Application bootstrap: wires the scene, the UI surface and the topic
//! controller together and owns them for the lifetime of the page.

use tracing::{error, info};

use crate::backend::RenderBackend;
use crate::camera::Viewport;
use crate::config::ViewerConfig;
use crate::error::{SceneError, TopicError};
use crate::scene::{axis_labels, SceneManager};
use crate::topic::{ObserverId, TopicChanged, TopicController};
use crate::topics::default_topics;
use crate::ui::{TopicButton, UiSurface};

pub struct Application<B: RenderBackend, U: UiSurface> {
    scene: SceneManager<B>,
    ui: U,
    controller: TopicController,
    config: ViewerConfig,
}

impl<B: RenderBackend, U: UiSurface> Application<B, U> {
    /// Bring everything up and show the default topic.
    ///
    /// `make_backend` runs after the loading indicator is visible. Any
    /// failure is shown on `ui` as a fatal error before being returned.
    pub fn start<F>(mut ui: U, make_backend: F, viewport: Viewport, config: ViewerConfig) -> Result<Self, SceneError>
    where
        F: FnOnce() -> Result<B, SceneError>,
    {
        ui.show_loading();

        let scene = match make_backend().and_then(|backend| SceneManager::initialize(backend, viewport, &config)) {
            Ok(scene) => scene,
            Err(err) => {
                error!(%err, "failed to initialize the scene");
                ui.show_fatal_error(&err.to_string());
                return Err(err);
            }
        };

        let mut controller = TopicController::new(default_topics());
        controller.initialize(&mut ui);
        controller.subscribe(|event: &TopicChanged| info!(topic = %event.id, "topic changed"));

        let mut app = Self {
            scene,
            ui,
            controller,
            config,
        };
        let default_topic = app.config.default_topic.clone();
        if let Err(err) = app.select_topic(&default_topic) {
            // Not fatal: the user can still pick a topic.
            error!(%err, "default topic unavailable");
        }
        app.ui.hide_loading();
        info!(width = viewport.width, height = viewport.height, "application started");
        Ok(app)
    }

    pub fn select_topic(&mut self, id: &str) -> Result<(), TopicError> {
        self.controller.load_topic(id, &mut self.scene, &mut self.ui)
    }

    pub fn set_parameter(&mut self, param: &str, value: f32) -> Result<(), TopicError> {
        self.controller.set_parameter(param, value, &mut self.scene, &mut self.ui)
    }

    /// Orbit by a pointer drag measured in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        let speed = self.config.camera.rotate_speed;
        self.scene.controls_mut().rotate(-dx * speed, -dy * speed);
    }

    /// Zoom by a wheel delta; negative values move closer.
    pub fn zoom(&mut self, delta: f32) {
        let speed = self.config.camera.zoom_speed;
        self.scene.controls_mut().zoom(-delta * speed);
    }

    /// Pan by a pointer drag measured in pixels.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let speed = self.config.camera.pan_speed;
        self.scene.pan(-dx * speed, dy * speed);
    }

    pub fn reset_view(&mut self) {
        self.scene.reset_view(&self.config.camera);
    }

    /// Permanent axis and plane labels, once a host can draw text.
    pub fn add_axis_labels(&mut self) {
        let labels = axis_labels(&self.config.scene);
        self.scene.add_labels(labels);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.on_resize(viewport);
    }

    /// One render-loop tick; `false` once torn down.
    pub fn frame(&mut self) -> bool {
        self.scene.frame()
    }

    pub fn teardown(&mut self) {
        self.scene.teardown();
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&TopicChanged) + 'static) -> ObserverId {
        self.controller.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.controller.unsubscribe(id)
    }

    pub fn active_topic(&self) -> Option<&'static str> {
        self.controller.active_topic()
    }

    pub fn topic_buttons(&self) -> Vec<TopicButton> {
        self.controller.buttons()
    }

    pub fn scene(&self) -> &SceneManager<B> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneManager<B> {
        &mut self.scene
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut self.ui
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{HeadlessBackend, HeadlessUi};
    use crate::scene::SceneSink;

    fn start() -> Application<HeadlessBackend, HeadlessUi> {
        Application::start(
            HeadlessUi::new(),
            || Ok(HeadlessBackend::new()),
            Viewport::new(800, 600),
            ViewerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_start_shows_default_topic() {
        let app = start();
        assert_eq!(app.active_topic(), Some("welcome"));
        assert!(!app.ui().loading);
        assert_eq!(app.ui().buttons.len(), 4);
        assert_eq!(app.ui().active_button.as_deref(), Some("welcome"));
        assert!(app.ui().controls.is_some());
    }

    #[test]
    fn test_start_failure_is_fatal_and_visible() {
        let mut ui = HeadlessUi::new();
        let failed = Application::<HeadlessBackend, _>::start(
            &mut ui,
            || Err(SceneError::Unsupported("WebGL2 unavailable".to_string())),
            Viewport::new(800, 600),
            ViewerConfig::default(),
        )
        .is_err();
        assert!(failed);
        assert!(ui.loading);
        assert_eq!(ui.fatal_error.as_deref(), Some("3D rendering is not available: WebGL2 unavailable"));
        assert!(ui.buttons.is_empty());
    }

    #[test]
    fn test_reference_upload_failure_is_fatal() {
        let mut ui = HeadlessUi::new();
        let err = Application::start(
            &mut ui,
            || {
                let mut backend = HeadlessBackend::new();
                backend.fail_materials_after(0);
                Ok(backend)
            },
            Viewport::new(800, 600),
            ViewerConfig::default(),
        )
        .err();
        assert!(matches!(err, Some(SceneError::Backend(_))));
        assert!(ui.fatal_error.is_some());
    }

    #[test]
    fn test_unknown_default_topic_still_starts() {
        let config = ViewerConfig {
            default_topic: "nowhere".to_string(),
            ..ViewerConfig::default()
        };
        let app = Application::start(HeadlessUi::new(), || Ok(HeadlessBackend::new()), Viewport::new(80, 24), config)
            .unwrap();
        assert_eq!(app.active_topic(), None);
        assert!(!app.ui().loading);
    }

    #[test]
    fn test_parameter_updates_info() {
        let mut app = start();
        app.select_topic("points").unwrap();
        app.set_parameter("point-y", -2.0).unwrap();
        assert_eq!(app.ui().readout("Quadrant"), Some("4th Quadrant"));
        assert_eq!(app.scene().active_len(), 4);
    }

    #[test]
    fn test_labels_and_teardown() {
        let mut app = start();
        app.add_axis_labels();
        assert_eq!(app.scene().labels().len(), 5);
        assert!(app.frame());
        app.teardown();
        assert!(!app.frame());
        app.add_axis_labels();
        assert!(app.scene().labels().is_empty());
    }

    #[test]
    fn test_orbit_moves_camera() {
        let mut app = start();
        let before = app.scene().camera().position;
        app.orbit(120.0, 0.0);
        for _ in 0..10 {
            app.frame();
        }
        assert!((app.scene().camera().position - before).norm() > 1e-3);
    }
}
