//! Axis labels: font loading and a 2D canvas drawn over the WebGL one.

use ortho3d_core::backend::RenderFrame;
use ortho3d_core::camera::project_with;
use ortho3d_core::{BackendError, Viewport};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, Document, FontFace, HtmlCanvasElement};

pub const LABEL_FONT_FAMILY: &str = "ortho3d-labels";
const LABEL_FONT: &str = "bold 16px ortho3d-labels, sans-serif";

/// Load the label typeface and register it with the document.
pub async fn load_font(document: &Document, url: &str) -> Result<(), JsValue> {
    let face = FontFace::new_with_str(LABEL_FONT_FAMILY, &format!("url({url})"))?;
    JsFuture::from(face.load()?).await?;
    document.fonts().add(&face)?;
    Ok(())
}

pub struct LabelOverlay {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl LabelOverlay {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, BackendError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| BackendError::Unsupported("2D canvas context".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    pub fn resize(&self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
    }

    pub fn clear(&self) {
        self.ctx
            .clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
    }

    pub fn draw(&self, frame: &RenderFrame<'_>, viewport: Viewport) {
        self.clear();
        if frame.labels.is_empty() {
            return;
        }

        let view_proj = frame.view_projection();
        self.ctx.set_font(LABEL_FONT);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        for label in frame.labels {
            let Some((x, y, depth)) = project_with(&view_proj, &label.position, viewport) else {
                continue;
            };
            if !(-1.0..=1.0).contains(&depth) {
                continue;
            }
            self.ctx.set_fill_style_str(&label.color.css());
            // Only fails for non-finite coordinates, which were filtered above.
            let _ = self.ctx.fill_text(&label.text, x as f64, y as f64);
        }
    }

    pub fn remove(&self) {
        self.canvas.remove();
    }
}
