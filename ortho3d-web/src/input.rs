//! DOM event wiring: topic buttons, sliders, drawer, resize and the mouse
//! camera controls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ortho3d_core::Viewport;
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlCanvasElement, HtmlInputElement, MouseEvent, Node, WheelEvent, Window};

use crate::dom::{self, MENU_TOGGLE_ID, TOPIC_BUTTONS_ID, TOPIC_CONTROLS_ID};
use crate::WebApplication;

pub type SharedApp = Rc<RefCell<WebApplication>>;

/// Event listener that unregisters itself when dropped.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(target: &EventTarget, event: &'static str, handler: F) -> Result<Self, JsValue>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

/// Run `f` on the application unless it is already borrowed.
pub fn with_app(app: &SharedApp, f: impl FnOnce(&mut WebApplication)) {
    match app.try_borrow_mut() {
        Ok(mut app) => f(&mut app),
        Err(_) => debug!("application busy; event dropped"),
    }
}

pub fn container_viewport(container: &Element) -> Viewport {
    Viewport::new(container.client_width().max(1) as u32, container.client_height().max(1) as u32)
}

fn topic_from_event(event: &Event) -> Option<String> {
    let target: Element = event.target()?.dyn_into().ok()?;
    target.closest("[data-topic]").ok()??.get_attribute("data-topic")
}

fn slider_from_event(event: &Event) -> Option<(String, f32)> {
    let input: HtmlInputElement = event.target()?.dyn_into().ok()?;
    if input.type_() != "range" {
        return None;
    }
    let value = input.value_as_number();
    value.is_finite().then(|| (input.id(), value as f32))
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    button: i16,
    x: i32,
    y: i32,
}

/// Register every listener the viewer needs. Dropping the returned list
/// detaches them all.
pub fn wire(
    app: &SharedApp,
    window: &Window,
    document: &Document,
    canvas: &HtmlCanvasElement,
    container: &Element,
) -> Result<Vec<Listener>, JsValue> {
    let mut listeners = Vec::new();

    let buttons = dom::element(document, TOPIC_BUTTONS_ID)?;
    listeners.push(Listener::new(&buttons, "click", {
        let app = app.clone();
        move |event| {
            let Some(id) = topic_from_event(&event) else {
                return;
            };
            with_app(&app, |app| {
                if let Err(err) = app.select_topic(&id) {
                    warn!(%err, "topic button ignored");
                }
            });
        }
    })?);

    let controls = dom::element(document, TOPIC_CONTROLS_ID)?;
    listeners.push(Listener::new(&controls, "input", {
        let app = app.clone();
        move |event| {
            let Some((id, value)) = slider_from_event(&event) else {
                return;
            };
            with_app(&app, |app| match app.set_parameter(&id, value) {
                Ok(()) => app.ui_mut().show_slider_value(&id, value),
                Err(err) => warn!(%err, "slider input rejected"),
            });
        }
    })?);

    let toggle = dom::element(document, MENU_TOGGLE_ID)?;
    listeners.push(Listener::new(&toggle, "click", {
        let app = app.clone();
        move |event| {
            // Keep the document handler below from closing it again.
            event.stop_propagation();
            with_app(&app, |app| app.ui().toggle_drawer());
        }
    })?);

    listeners.push(Listener::new(document, "click", {
        let app = app.clone();
        move |event| {
            let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
            with_app(&app, |app| {
                let ui = app.ui();
                if ui.is_drawer_open() && ui.is_narrow() && !ui.sidebar().contains(target.as_ref()) {
                    ui.close_drawer();
                }
            });
        }
    })?);

    listeners.push(Listener::new(window, "resize", {
        let app = app.clone();
        let container = container.clone();
        move |_| with_app(&app, |app| app.resize(container_viewport(&container)))
    })?);

    let drag = Rc::new(Cell::new(None::<Drag>));

    listeners.push(Listener::new(canvas, "mousedown", {
        let drag = drag.clone();
        move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                drag.set(Some(Drag {
                    button: mouse.button(),
                    x: mouse.client_x(),
                    y: mouse.client_y(),
                }));
            }
        }
    })?);

    listeners.push(Listener::new(window, "mousemove", {
        let app = app.clone();
        let drag = drag.clone();
        move |event| {
            let (Some(last), Some(mouse)) = (drag.get(), event.dyn_ref::<MouseEvent>()) else {
                return;
            };
            let (x, y) = (mouse.client_x(), mouse.client_y());
            let (dx, dy) = ((x - last.x) as f32, (y - last.y) as f32);
            drag.set(Some(Drag { x, y, ..last }));
            with_app(&app, |app| match last.button {
                0 => app.orbit(dx, dy),
                2 => app.pan(dx, dy),
                _ => {}
            });
        }
    })?);

    listeners.push(Listener::new(window, "mouseup", {
        let drag = drag.clone();
        move |_| drag.set(None)
    })?);

    listeners.push(Listener::new(canvas, "contextmenu", |event| event.prevent_default())?);

    listeners.push(Listener::new(canvas, "wheel", {
        let app = app.clone();
        move |event| {
            event.prevent_default();
            if let Some(wheel) = event.dyn_ref::<WheelEvent>() {
                let delta = wheel.delta_y() as f32;
                with_app(&app, |app| app.zoom(delta));
            }
        }
    })?);

    debug!(count = listeners.len(), "event listeners attached");
    Ok(listeners)
}
