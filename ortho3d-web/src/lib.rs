/// ortho3d web host: WebGL2 scene, DOM panels and the page's event wiring
///
/// JavaScript calls `boot()` once the page has loaded, and `teardown()` to
/// release everything.
use std::cell::{Cell, RefCell, RefMut};
use std::rc::Rc;

use ortho3d_core::{Application, SceneError, ViewerConfig};
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, Window};

pub mod dom;
pub mod input;
pub mod labels;
pub mod logging;
pub mod markup;
pub mod webgl;

use dom::{DomUi, CANVAS_CONTAINER_ID};
use input::{with_app, Listener, SharedApp};
use webgl::WebGlBackend;

pub type WebApplication = Application<WebGlBackend, DomUi>;

/// Self-rescheduling `requestAnimationFrame` callback
struct FrameLoop {
    window: Window,
    callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    handle: Rc<Cell<i32>>,
}

impl FrameLoop {
    fn start(window: &Window, app: SharedApp) -> Result<Self, JsValue> {
        let callback: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
        let handle = Rc::new(Cell::new(0));

        let next = callback.clone();
        let next_handle = handle.clone();
        let next_window = window.clone();
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            let mut running = true;
            with_app(&app, |app| running = app.frame());
            if !running {
                debug!("render loop stopped");
                return;
            }
            if let Some(cb) = next.borrow().as_ref() {
                match next_window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => next_handle.set(id),
                    Err(err) => warn!(?err, "could not schedule the next frame"),
                }
            }
        }) as Box<dyn FnMut()>));

        if let Some(cb) = callback.borrow().as_ref() {
            handle.set(window.request_animation_frame(cb.as_ref().unchecked_ref())?);
        }
        Ok(Self {
            window: window.clone(),
            callback,
            handle,
        })
    }

    /// Cancel the pending frame and break the closure's self-reference.
    fn stop(&self) {
        let _ = self.window.cancel_animation_frame(self.handle.get());
        self.callback.borrow_mut().take();
    }
}

struct Host {
    /// Which `boot()` call created this host.
    generation: u64,
    app: SharedApp,
    listeners: Vec<Listener>,
    frame_loop: FrameLoop,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
    static GENERATION: Cell<u64> = const { Cell::new(0) };
}

/// Number for a new boot; late async work from older boots compares
/// against it and backs off.
fn next_generation() -> u64 {
    GENERATION.with(|generation| {
        let next = generation.get() + 1;
        generation.set(next);
        next
    })
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn borrow_app(host: &Host) -> Result<RefMut<'_, WebApplication>, JsValue> {
    host.app
        .try_borrow_mut()
        .map_err(|_| JsValue::from_str("ortho3d is busy handling another event"))
}

fn with_host<T>(f: impl FnOnce(&Host) -> Result<T, JsValue>) -> Result<T, JsValue> {
    HOST.with(|host| match host.borrow().as_ref() {
        Some(host) => f(host),
        None => Err(JsValue::from_str("ortho3d is not running; call boot() first")),
    })
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init("info");
}

/// WebGL canvas plus a transparent 2D canvas on top for labels.
fn create_canvases(document: &Document, container: &Element) -> Result<(HtmlCanvasElement, HtmlCanvasElement), SceneError> {
    let mut created: Vec<HtmlCanvasElement> = Vec::with_capacity(2);
    let mut create = || -> Result<HtmlCanvasElement, JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        container.append_child(&canvas)?;
        created.push(canvas.clone());
        Ok(canvas)
    };
    let mut setup = || -> Result<(HtmlCanvasElement, HtmlCanvasElement), JsValue> {
        let scene = create()?;
        scene.style().set_property("display", "block")?;
        let overlay = create()?;
        let style = overlay.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", "0")?;
        style.set_property("left", "0")?;
        style.set_property("pointer-events", "none")?;
        Ok((scene, overlay))
    };
    let result = setup();
    result.map_err(|err| {
        for canvas in &created {
            canvas.remove();
        }
        SceneError::Unsupported(format!("canvas setup failed: {err:?}"))
    })
}

/// Create both canvases and hand them to `create`. If the backend cannot
/// be built the canvases are taken out of the page again.
fn mount_backend<B, F>(document: &Document, container: &Element, create: F) -> Result<B, SceneError>
where
    F: FnOnce(HtmlCanvasElement, HtmlCanvasElement) -> Result<B, SceneError>,
{
    let (scene, overlay) = create_canvases(document, container)?;
    create(scene.clone(), overlay.clone()).inspect_err(|_| {
        scene.remove();
        overlay.remove();
    })
}

/// Put a fatal error into the loading region, for failures that happen
/// before there is a [`DomUi`] to report them.
fn report_fatal(document: &Document, message: &str) {
    let Some(loading) = document.get_element_by_id(dom::LOADING_ID) else {
        error!(reason = message, "no loading region to report a fatal error in");
        return;
    };
    loading.set_inner_html(&markup::fatal_error_html(message));
    if let Some(loading) = loading.dyn_ref::<HtmlElement>() {
        let _ = loading.style().set_property("display", "flex");
    }
}

/// Start the viewer. `config_json` may override any [`ViewerConfig`] field.
///
/// Booting again replaces the running instance. Any failure is also shown
/// in the page's loading region.
#[wasm_bindgen]
pub fn boot(config_json: Option<String>) -> Result<(), JsValue> {
    teardown();

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let generation = next_generation();
    let (host, font_url) = match start_host(&window, &document, config_json.as_deref(), generation) {
        Ok(started) => started,
        Err(err) => {
            let reason = err.as_string().unwrap_or_else(|| format!("{err:?}"));
            error!(%reason, "ortho3d failed to start");
            report_fatal(&document, &reason);
            return Err(err);
        }
    };
    HOST.with(|slot| *slot.borrow_mut() = Some(host));

    // Labels are best effort: the scene is usable without them.
    wasm_bindgen_futures::spawn_local(async move {
        match labels::load_font(&document, &font_url).await {
            Ok(()) => {
                let added = with_host(|host| {
                    if host.generation != generation {
                        return Err(JsValue::from_str("stale boot"));
                    }
                    with_app(&host.app, |app| app.add_axis_labels());
                    Ok(())
                });
                if added.is_err() {
                    debug!(generation, "label font loaded for a boot that is gone");
                }
            }
            Err(err) => warn!(?err, url = %font_url, "label font failed to load; axis labels skipped"),
        }
    });

    info!(generation, "ortho3d booted");
    Ok(())
}

fn start_host(
    window: &Window,
    document: &Document,
    config_json: Option<&str>,
    generation: u64,
) -> Result<(Host, String), JsValue> {
    let config = match config_json {
        Some(json) => ViewerConfig::from_json_str(json).map_err(to_js)?,
        None => ViewerConfig::default(),
    };
    let container = dom::element(document, CANVAS_CONTAINER_ID)?;
    let font_url = config.label_font_url.clone();
    let ui = DomUi::new(window, document, config.narrow_viewport_px)?;

    let app = Application::start(
        ui,
        || mount_backend(document, &container, |scene, overlay| WebGlBackend::new(scene, Some(overlay))),
        input::container_viewport(&container),
        config,
    )
    .map_err(to_js)?;

    let canvas = app
        .scene()
        .backend()
        .map(|backend| backend.canvas().clone())
        .ok_or("scene backend missing after start")?;
    let app: SharedApp = Rc::new(RefCell::new(app));
    let listeners = input::wire(&app, window, document, &canvas, &container)?;
    let frame_loop = FrameLoop::start(window, app.clone())?;

    Ok((
        Host {
            generation,
            app,
            listeners,
            frame_loop,
        },
        font_url,
    ))
}

/// Stop rendering, detach listeners and release every GPU resource.
#[wasm_bindgen]
pub fn teardown() {
    let Some(host) = HOST.with(|host| host.borrow_mut().take()) else {
        return;
    };
    host.frame_loop.stop();
    drop(host.listeners);
    let busy = match host.app.try_borrow_mut() {
        Ok(mut app) => {
            app.teardown();
            false
        }
        Err(_) => true,
    };
    if busy {
        warn!("teardown while the application was busy; resources freed on drop");
    }
}

#[wasm_bindgen(js_name = loadTopic)]
pub fn load_topic(id: &str) -> Result<(), JsValue> {
    with_host(|host| borrow_app(host)?.select_topic(id).map_err(to_js))
}

#[wasm_bindgen(js_name = setParameter)]
pub fn set_parameter(param: &str, value: f32) -> Result<(), JsValue> {
    with_host(|host| {
        let mut app = borrow_app(host)?;
        let value = app.ui().normalize(param, value).unwrap_or(value);
        app.set_parameter(param, value).map_err(to_js)?;
        app.ui_mut().show_slider_value(param, value);
        Ok(())
    })
}

#[wasm_bindgen(js_name = activeTopic)]
pub fn active_topic() -> Option<String> {
    with_host(|host| Ok(borrow_app(host)?.active_topic().map(str::to_string)))
        .ok()
        .flatten()
}

/// Call `callback(topicId)` after every successful topic switch.
#[wasm_bindgen(js_name = onTopicChange)]
pub fn on_topic_change(callback: js_sys::Function) -> Result<(), JsValue> {
    with_host(|host| {
        borrow_app(host)?.subscribe(move |event| {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&event.id)) {
                warn!(?err, "topic change callback threw");
            }
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_boot_gets_a_newer_generation() {
        let first = next_generation();
        let second = next_generation();
        assert!(second > first);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn page(body: &str) -> Document {
        let document = web_sys::window().and_then(|w| w.document()).expect("document");
        document.body().expect("body").set_inner_html(body);
        document
    }

    #[wasm_bindgen_test]
    fn bad_config_is_shown_in_the_loading_region() {
        let document = page(r#"<div id="loading">Loading…</div>"#);
        assert!(boot(Some("{ nope".to_string())).is_err());
        let loading = document.get_element_by_id(dom::LOADING_ID).expect("loading");
        assert!(loading.inner_html().contains("invalid configuration"));
        assert!(loading.inner_html().contains("Retry"));
    }

    #[wasm_bindgen_test]
    fn missing_container_is_shown_in_the_loading_region() {
        let document = page(r#"<div id="loading">Loading…</div>"#);
        assert!(boot(None).is_err());
        let loading = document.get_element_by_id(dom::LOADING_ID).expect("loading");
        assert!(loading.inner_html().contains("canvas-container"));
    }

    #[wasm_bindgen_test]
    fn failed_backend_leaves_no_canvases() {
        let document = page(r#"<div id="canvas-container"></div>"#);
        let container = dom::element(&document, CANVAS_CONTAINER_ID).expect("container");
        let result: Result<(), SceneError> = mount_backend(&document, &container, |_, _| {
            Err(SceneError::Unsupported("no WebGL2".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(container.child_element_count(), 0);

        let mounted = mount_backend(&document, &container, |scene, overlay| Ok((scene, overlay)));
        assert!(mounted.is_ok());
        assert_eq!(container.child_element_count(), 2);
    }
}
