//! DOM implementation of the UI surface port.

use ortho3d_core::{Panel, TopicButton, UiSurface};
use tracing::warn;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, Window};

use crate::markup;

pub const CANVAS_CONTAINER_ID: &str = "canvas-container";
pub const LOADING_ID: &str = "loading";
pub const INFO_PANEL_ID: &str = "info-panel";
pub const TOPIC_CONTROLS_ID: &str = "topic-controls";
pub const TOPIC_BUTTONS_ID: &str = "topic-buttons";
pub const SIDEBAR_ID: &str = "sidebar";
pub const MENU_TOGGLE_ID: &str = "menu-toggle";

/// Fetch a required element by id.
pub fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id} element")))
}

/// Page regions the viewer writes into
pub struct DomUi {
    window: Window,
    document: Document,
    narrow_viewport_px: u32,
    loading: HtmlElement,
    info: Element,
    controls: Element,
    buttons: Element,
    sidebar: Element,
    /// Last controls panel, for formatting slider values.
    current_controls: Option<Panel>,
}

impl DomUi {
    pub fn new(window: &Window, document: &Document, narrow_viewport_px: u32) -> Result<Self, JsValue> {
        Ok(Self {
            window: window.clone(),
            document: document.clone(),
            narrow_viewport_px,
            loading: element(document, LOADING_ID)?.dyn_into()?,
            info: element(document, INFO_PANEL_ID)?,
            controls: element(document, TOPIC_CONTROLS_ID)?,
            buttons: element(document, TOPIC_BUTTONS_ID)?,
            sidebar: element(document, SIDEBAR_ID)?,
            current_controls: None,
        })
    }

    pub fn sidebar(&self) -> &Element {
        &self.sidebar
    }

    /// Below the configured width the drawer overlays the scene.
    pub fn is_narrow(&self) -> bool {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .is_some_and(|width| width < self.narrow_viewport_px as f64)
    }

    pub fn is_drawer_open(&self) -> bool {
        self.sidebar.class_list().contains("open")
    }

    pub fn toggle_drawer(&self) {
        if let Err(err) = self.sidebar.class_list().toggle("open") {
            warn!(?err, "could not toggle navigation drawer");
        }
    }

    pub fn close_drawer(&self) {
        if let Err(err) = self.sidebar.class_list().remove_1("open") {
            warn!(?err, "could not close navigation drawer");
        }
    }

    /// Snap and clamp a value the way the slider `id` would.
    pub fn normalize(&self, slider_id: &str, value: f32) -> Option<f32> {
        Some(self.current_controls.as_ref()?.find_slider(slider_id)?.normalize(value))
    }

    /// Show a slider's new value next to it after input.
    pub fn show_slider_value(&mut self, slider_id: &str, value: f32) {
        let Some(panel) = self.current_controls.as_mut() else {
            return;
        };
        panel.set_slider_value(slider_id, value);
        let Some(text) = panel.find_slider(slider_id).map(|spec| spec.format_value(value)) else {
            return;
        };
        if let Some(display) = self.document.get_element_by_id(&markup::value_display_id(slider_id)) {
            display.set_text_content(Some(&text));
        }
        // Programmatic changes also move the range input itself.
        if let Some(input) = self
            .document
            .get_element_by_id(slider_id)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
        {
            if input.value_as_number() as f32 != value {
                input.set_value_as_number(value as f64);
            }
        }
    }

    fn set_loading_visible(&self, visible: bool) {
        let display = if visible { "flex" } else { "none" };
        if let Err(err) = self.loading.style().set_property("display", display) {
            warn!(?err, "could not toggle loading indicator");
        }
    }
}

impl UiSurface for DomUi {
    fn render_topic_buttons(&mut self, topics: &[TopicButton]) {
        self.buttons.set_inner_html(&markup::topic_buttons_html(topics));
    }

    fn set_active_button(&mut self, id: &str) {
        let Ok(buttons) = self.buttons.query_selector_all(".topic-btn") else {
            return;
        };
        for index in 0..buttons.length() {
            let Some(button) = buttons.item(index).and_then(|node| node.dyn_into::<Element>().ok()) else {
                continue;
            };
            let active = button.get_attribute("data-topic").as_deref() == Some(id);
            if let Err(err) = button.class_list().toggle_with_force("active", active) {
                warn!(?err, "could not update topic button");
            }
        }
        if self.is_narrow() {
            self.close_drawer();
        }
    }

    fn set_controls(&mut self, panel: &Panel) {
        self.controls.set_inner_html(&markup::panel_html(panel));
        self.current_controls = Some(panel.clone());
    }

    fn clear_controls(&mut self) {
        self.controls.set_inner_html("");
        self.current_controls = None;
    }

    fn set_info(&mut self, panel: &Panel) {
        self.info.set_inner_html(&markup::panel_html(panel));
    }

    fn show_loading(&mut self) {
        self.set_loading_visible(true);
    }

    fn hide_loading(&mut self) {
        self.set_loading_visible(false);
    }

    fn show_fatal_error(&mut self, message: &str) {
        self.loading.set_inner_html(&markup::fatal_error_html(message));
        self.set_loading_visible(true);
    }
}
