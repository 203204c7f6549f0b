//! Rendering: draws the cell grid and the active-cell outline to a 2D context.
//!
//! This module only reads engine state; it never mutates it. Fallible
//! `Canvas2D` calls propagate `Result<(), JsValue>` to the caller.

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::model::{Cell, Point};
use crate::state::ViewportEngine;

/// Fixed styling applied on top of the engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub background: String,
    pub highlight_color: String,
    /// Outline width in screen pixels.
    pub highlight_width: f64,
}

/// Draw one frame onto a surface of `width` x `height` device pixels.
///
/// # Errors
///
/// Returns `Err` if a transform call is rejected by the context.
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    engine: &ViewportEngine,
    style: &Style,
    width: f64,
    height: f64,
) -> Result<(), JsValue> {
    let vp = engine.viewport();
    let size = engine.pixel_size();

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_fill_style_str(&style.background);
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_transform(vp.scale, 0.0, 0.0, vp.scale, vp.translate.x, vp.translate.y)?;
    let side = size * vp.scale;
    for cell in engine.grid().cells() {
        let (x, y) = cell_origin(cell, size);
        let on_screen = vp.world_to_screen(Point::new(x, y));
        if on_screen.x + side < 0.0 || on_screen.y + side < 0.0 || on_screen.x > width || on_screen.y > height {
            continue;
        }
        ctx.set_fill_style_str(&cell.color.css_rgb());
        ctx.fill_rect(x, y, size, size);
    }

    if let Some(active) = engine.active_cell() {
        let (x, y) = cell_origin(&active, size);
        ctx.set_stroke_style_str(&style.highlight_color);
        // Compensate for the scale so the outline keeps its on-screen width.
        ctx.set_line_width(style.highlight_width / vp.scale);
        ctx.stroke_rect(x, y, size, size);
    }

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    Ok(())
}

fn cell_origin(cell: &Cell, size: f64) -> (f64, f64) {
    (
        f64::from(cell.position.x) * size,
        f64::from(cell.position.y) * size,
    )
}
