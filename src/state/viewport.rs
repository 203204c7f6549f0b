//! Viewport engine: the pan/zoom state machine and active-cell hit-testing.
//!
//! `ViewportEngine` holds no browser handles, so it runs under plain
//! `cargo test`. The `PixelCanvas` component translates DOM events into the
//! calls below and redraws after each one.

use std::rc::Rc;

use crate::config::ViewerConfig;
use crate::model::{Cell, Grid, Point};
use crate::state::{DragState, PinchState, ViewportState};

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

/// Called with the new active cell whenever it changes.
pub type ActiveCellObserver = Box<dyn FnMut(Option<Cell>)>;

pub struct ViewportEngine {
    grid: Rc<Grid>,
    pixel_size: f64,
    zoom_step: f64,
    viewport: ViewportState,
    drag: DragState,
    pinch: PinchState,
    active: Option<Cell>,
    observer: Option<ActiveCellObserver>,
}

impl ViewportEngine {
    #[must_use]
    pub fn new(grid: Rc<Grid>, config: &ViewerConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            grid,
            pixel_size: config.pixel_size,
            zoom_step: config.zoom_step,
            viewport: ViewportState::default(),
            drag: DragState::default(),
            pinch: PinchState::default(),
            active: None,
            observer: None,
        }
    }

    // --- Observer ---

    pub fn set_observer(&mut self, observer: impl FnMut(Option<Cell>) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // --- Drag ---

    pub fn drag_start(&mut self, screen: Point) {
        self.drag.begin(screen, self.viewport.translate);
    }

    /// Pan so the content follows the pointer. No-op unless dragging.
    pub fn drag_move(&mut self, screen: Point) -> bool {
        match self.drag.translate_for(screen) {
            Some(translate) => {
                self.viewport.translate = translate;
                true
            }
            None => false,
        }
    }

    pub fn drag_end(&mut self) {
        self.drag.end();
    }

    /// Mouse button released at `screen`, or off the surface when `None`.
    /// Ends the drag and re-resolves the hovered cell.
    pub fn pointer_up(&mut self, screen: Option<Point>) {
        self.drag_end();
        match screen {
            Some(p) => self.hover(p),
            None => self.pointer_out(),
        }
    }

    // --- Zoom ---

    /// One wheel notch at `screen`: scrolling up (`delta_y < 0`) zooms in by
    /// the zoom step, scrolling down zooms out. A zero or non-finite delta
    /// does nothing.
    pub fn wheel(&mut self, screen: Point, delta_y: f64) -> bool {
        let factor = if delta_y < 0.0 {
            1.0 + self.zoom_step
        } else if delta_y > 0.0 {
            1.0 - self.zoom_step
        } else {
            return false;
        };
        self.zoom_at(screen, factor)
    }

    /// Scale by `factor` around the screen point `anchor`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        self.viewport.zoom_at(anchor, factor)
    }

    pub fn pinch_start(&mut self, a: Point, b: Point) {
        self.pinch.begin(a, b);
    }

    /// Scale by the change in touch distance since the previous pinch event.
    /// Translate is left alone, so the pinch is not anchored at the touches.
    pub fn pinch_change(&mut self, a: Point, b: Point) -> bool {
        match self.pinch.advance(a, b) {
            Some(ratio) => self.viewport.zoom_origin(ratio),
            None => false,
        }
    }

    pub fn pinch_end(&mut self) {
        self.pinch.end();
    }

    /// Touches were lifted; `remaining` are the ones still down. Two or more
    /// restart the pinch from the first two, one resumes panning.
    pub fn touch_end(&mut self, remaining: &[Point]) {
        self.pinch_end();
        match remaining {
            [p] => self.drag_start(*p),
            [a, b, ..] => {
                self.drag_end();
                self.pinch_start(*a, *b);
            }
            [] => self.drag_end(),
        }
    }

    /// Back to scale 1 with the grid at the surface origin.
    pub fn reset_view(&mut self) {
        self.viewport = ViewportState::default();
        self.drag.end();
        self.pinch.end();
    }

    // --- Hover ---

    /// Pointer moved over the surface: pan while dragging, otherwise hover.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        if self.drag.is_dragging {
            self.drag_move(screen)
        } else {
            self.hover(screen);
            false
        }
    }

    /// Resolve the cell under `screen` and notify the observer on change.
    pub fn hover(&mut self, screen: Point) {
        let cell = self.hit_test(screen);
        self.set_active(cell);
    }

    /// The pointer left the surface.
    pub fn pointer_out(&mut self) {
        self.set_active(None);
    }

    /// Inverse-map `screen` to the grid and return the cell there, if any.
    #[must_use]
    pub fn hit_test(&self, screen: Point) -> Option<Cell> {
        let world = self.viewport.screen_to_world(screen);
        let cx = (world.x / self.pixel_size).floor();
        let cy = (world.y / self.pixel_size).floor();
        if !(cx >= 0.0 && cy >= 0.0) {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (cx, cy) = (cx as usize, cy as usize);
        if cy >= self.grid.row_count() || cx >= self.grid.column_count(cy) {
            return None;
        }
        self.grid.cell(cx, cy).copied()
    }

    fn set_active(&mut self, cell: Option<Cell>) {
        let previous = self.active.map(|c| c.position);
        if previous == cell.map(|c| c.position) {
            return;
        }
        self.active = cell;
        if let Some(observer) = self.observer.as_mut() {
            observer(cell);
        }
    }

    // --- Queries ---

    #[must_use]
    pub fn viewport(&self) -> ViewportState {
        self.viewport
    }

    #[must_use]
    pub fn active_cell(&self) -> Option<Cell> {
        self.active
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging
    }

    #[must_use]
    pub fn pinch(&self) -> PinchState {
        self.pinch
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }
}
