//! Topic trait and the controller that switches between topics.

use tracing::{error, info, warn};

use crate::error::TopicError;
use crate::scene::SceneSink;
use crate::ui::{TopicButton, UiSurface};

/// What a topic may touch while loading, cleaning up or redrawing
pub struct TopicContext<'a> {
    pub scene: &'a mut dyn SceneSink,
    pub ui: &'a mut dyn UiSurface,
}

/// A lesson: owns its parameters, its control panel and its drawing.
pub trait Topic {
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    /// Build the control panel and draw the initial state.
    fn load(&mut self, ctx: &mut TopicContext<'_>);

    /// Release whatever this topic put in the scene. Stateless topics keep
    /// the default no-op.
    fn cleanup(&mut self, ctx: &mut TopicContext<'_>) {
        let _ = ctx;
    }

    /// Apply one control change and redraw.
    fn set_parameter(&mut self, ctx: &mut TopicContext<'_>, param: &str, value: f32) -> Result<(), TopicError> {
        let _ = (ctx, value);
        Err(TopicError::UnknownParameter {
            topic: self.id().to_string(),
            param: param.to_string(),
        })
    }
}

/// Sent to observers after a topic finished loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicChanged {
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&TopicChanged)>;

/// Registry of topics plus the identifier of the active one.
///
/// Switching is synchronous: cleanup, clear and load all happen inside one
/// [`TopicController::load_topic`] call, so no frame ever shows two topics.
pub struct TopicController {
    topics: Vec<Box<dyn Topic>>,
    active: Option<usize>,
    observers: Vec<(ObserverId, Observer)>,
    next_observer: u64,
}

impl TopicController {
    pub fn new(topics: Vec<Box<dyn Topic>>) -> Self {
        Self {
            topics,
            active: None,
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn buttons(&self) -> Vec<TopicButton> {
        self.topics
            .iter()
            .map(|topic| TopicButton {
                id: topic.id(),
                name: topic.name(),
            })
            .collect()
    }

    /// Publish the topic list to the UI.
    pub fn initialize(&self, ui: &mut dyn UiSurface) {
        ui.render_topic_buttons(&self.buttons());
    }

    pub fn active_topic(&self) -> Option<&'static str> {
        self.active.map(|index| self.topics[index].id())
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&TopicChanged) + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer, _)| *observer != id);
        self.observers.len() != before
    }

    /// Switch to `id`.
    ///
    /// The previous topic is cleaned up and the scene cleared even when
    /// `id` turns out to be unknown; in that case no topic is active
    /// afterwards and the error is returned.
    pub fn load_topic(&mut self, id: &str, scene: &mut dyn SceneSink, ui: &mut dyn UiSurface) -> Result<(), TopicError> {
        if let Some(previous) = self.active.take() {
            let mut ctx = TopicContext {
                scene: &mut *scene,
                ui: &mut *ui,
            };
            self.topics[previous].cleanup(&mut ctx);
        }
        scene.clear_simulation();
        ui.set_active_button(id);

        let Some(index) = self.topics.iter().position(|topic| topic.id() == id) else {
            error!(topic = id, "topic not found");
            return Err(TopicError::UnknownTopic(id.to_string()));
        };

        self.active = Some(index);
        let mut ctx = TopicContext { scene, ui };
        self.topics[index].load(&mut ctx);
        info!(topic = id, objects = ctx.scene.active_len(), "topic loaded");

        let event = TopicChanged { id: id.to_string() };
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
        Ok(())
    }

    /// Forward a control change to the active topic.
    pub fn set_parameter(
        &mut self,
        param: &str,
        value: f32,
        scene: &mut dyn SceneSink,
        ui: &mut dyn UiSurface,
    ) -> Result<(), TopicError> {
        let Some(index) = self.active else {
            warn!(param, "parameter change with no active topic");
            return Err(TopicError::NoActiveTopic);
        };
        let mut ctx = TopicContext { scene, ui };
        self.topics[index].set_parameter(&mut ctx, param, value).inspect_err(|err| {
            warn!(%err, "parameter change rejected");
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::geometry::{Color, SceneObject};
    use crate::headless::HeadlessUi;
    use nalgebra::Point3;

    /// Counts objects in place of a real scene.
    #[derive(Default)]
    struct CountingScene {
        objects: usize,
        clears: usize,
    }

    impl SceneSink for CountingScene {
        fn add_object(&mut self, _object: SceneObject) {
            self.objects += 1;
        }

        fn clear_simulation(&mut self) {
            self.objects = 0;
            self.clears += 1;
        }

        fn active_len(&self) -> usize {
            self.objects
        }
    }

    /// Draws `markers` points and logs its lifecycle calls.
    struct Probe {
        id: &'static str,
        markers: usize,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Topic for Probe {
        fn id(&self) -> &'static str {
            self.id
        }

        fn name(&self) -> &'static str {
            "Probe"
        }

        fn load(&mut self, ctx: &mut TopicContext<'_>) {
            self.log.borrow_mut().push(format!("load {}", self.id));
            for _ in 0..self.markers {
                ctx.scene.add_object(SceneObject::marker(Point3::origin(), Color::hex(0xffffff)));
            }
        }

        fn cleanup(&mut self, ctx: &mut TopicContext<'_>) {
            self.log.borrow_mut().push(format!("cleanup {}", self.id));
            ctx.scene.clear_simulation();
        }
    }

    fn controller(log: &Rc<RefCell<Vec<String>>>) -> TopicController {
        TopicController::new(vec![
            Box::new(Probe { id: "a", markers: 2, log: log.clone() }),
            Box::new(Probe { id: "b", markers: 3, log: log.clone() }),
        ])
    }

    #[test]
    fn test_initialize_renders_buttons() {
        let log = Rc::default();
        let controller = controller(&log);
        let mut ui = HeadlessUi::new();
        controller.initialize(&mut ui);
        let ids: Vec<_> = ui.buttons.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(controller.active_topic(), None);
    }

    #[test]
    fn test_switch_cleans_up_previous_then_loads() {
        let log = Rc::default();
        let mut controller = controller(&log);
        let mut scene = CountingScene::default();
        let mut ui = HeadlessUi::new();

        controller.load_topic("a", &mut scene, &mut ui).unwrap();
        assert_eq!(scene.objects, 2);
        controller.load_topic("b", &mut scene, &mut ui).unwrap();
        assert_eq!(scene.objects, 3);
        assert_eq!(controller.active_topic(), Some("b"));
        assert_eq!(ui.active_button.as_deref(), Some("b"));
        assert_eq!(*log.borrow(), vec!["load a", "cleanup a", "load b"]);
    }

    #[test]
    fn test_unknown_topic_clears_and_unsets() {
        let log = Rc::default();
        let mut controller = controller(&log);
        let mut scene = CountingScene::default();
        let mut ui = HeadlessUi::new();

        controller.load_topic("a", &mut scene, &mut ui).unwrap();
        let err = controller.load_topic("nope", &mut scene, &mut ui).unwrap_err();
        assert_eq!(err, TopicError::UnknownTopic("nope".to_string()));
        assert_eq!(scene.objects, 0);
        assert_eq!(controller.active_topic(), None);
        assert_eq!(ui.active_button.as_deref(), Some("nope"));

        controller.load_topic("b", &mut scene, &mut ui).unwrap();
        assert_eq!(scene.objects, 3);
        // No cleanup for the failed switch: nothing was active.
        assert_eq!(*log.borrow(), vec!["load a", "cleanup a", "load b"]);
    }

    #[test]
    fn test_observers_see_successful_loads_only() {
        let log = Rc::default();
        let mut controller = controller(&log);
        let seen: Rc<RefCell<Vec<String>>> = Rc::default();
        let sink = seen.clone();
        let id = controller.subscribe(move |event| sink.borrow_mut().push(event.id.clone()));

        let mut scene = CountingScene::default();
        let mut ui = HeadlessUi::new();
        controller.load_topic("a", &mut scene, &mut ui).unwrap();
        let _ = controller.load_topic("missing", &mut scene, &mut ui);
        controller.load_topic("b", &mut scene, &mut ui).unwrap();
        assert_eq!(*seen.borrow(), vec!["a", "b"]);

        assert!(controller.unsubscribe(id));
        assert!(!controller.unsubscribe(id));
        controller.load_topic("a", &mut scene, &mut ui).unwrap();
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_parameter_without_active_topic() {
        let log = Rc::default();
        let mut controller = controller(&log);
        let mut scene = CountingScene::default();
        let mut ui = HeadlessUi::new();
        assert_eq!(
            controller.set_parameter("x", 1.0, &mut scene, &mut ui),
            Err(TopicError::NoActiveTopic)
        );
    }

    #[test]
    fn test_default_set_parameter_rejects() {
        let log = Rc::default();
        let mut controller = controller(&log);
        let mut scene = CountingScene::default();
        let mut ui = HeadlessUi::new();
        controller.load_topic("a", &mut scene, &mut ui).unwrap();
        assert!(matches!(
            controller.set_parameter("x", 1.0, &mut scene, &mut ui),
            Err(TopicError::UnknownParameter { .. })
        ));
    }
}
