//! The visible drawing surface: canvas element, 2D context and sizing.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::ViewerError;
use crate::render::{self, Style};
use crate::state::ViewportEngine;

/// Acquire the 2D context of `canvas`.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, ViewerError> {
    canvas
        .get_context("2d")
        .map_err(|_| ViewerError::SurfaceUnavailable)?
        .ok_or(ViewerError::SurfaceUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| ViewerError::SurfaceUnavailable)
}

/// The visible canvas and its context, held for the viewer's lifetime.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    style: Style,
}

impl CanvasSurface {
    /// Bind to `canvas`. Fails when no 2D context is available.
    pub fn new(canvas: HtmlCanvasElement, style: Style) -> Result<Self, ViewerError> {
        let ctx = context_2d(&canvas)?;
        Ok(Self { canvas, ctx, style })
    }

    #[must_use]
    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Match the backing store to the canvas' container. The viewport
    /// transform is untouched, so content stays put relative to the top-left.
    pub fn fit_to_container(&self) {
        let (width, height) = self.container_size();
        if width != self.canvas.width() || height != self.canvas.height() {
            log::debug!("canvas resized to {width}x{height}");
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
    }

    fn container_size(&self) -> (u32, u32) {
        let from_parent = self
            .canvas
            .parent_element()
            .map(|p| (p.client_width(), p.client_height()))
            .filter(|&(w, h)| w > 0 && h > 0);
        let (w, h) = from_parent.map_or_else(
            || {
                let dim = |v: Result<JsValue, JsValue>| v.map_or(0.0, |v| v.as_f64().unwrap_or(0.0));
                web_sys::window().map_or((0.0, 0.0), |w| (dim(w.inner_width()), dim(w.inner_height())))
            },
            |(w, h)| (f64::from(w), f64::from(h)),
        );
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        (w.max(0.0) as u32, h.max(0.0) as u32)
    }

    /// Redraw the whole frame from the engine state.
    pub fn render(&self, engine: &ViewportEngine) -> Result<(), JsValue> {
        render::draw(
            &self.ctx,
            engine,
            &self.style,
            f64::from(self.canvas.width()),
            f64::from(self.canvas.height()),
        )
    }
}
