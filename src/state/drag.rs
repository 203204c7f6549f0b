// Drag-to-pan gesture state
use crate::model::Point;

#[derive(Default, Debug, Clone, Copy)]
pub struct DragState {
    pub is_dragging: bool,
    /// Screen point where the drag began.
    pub drag_start: Point,
    /// Translate captured at drag start.
    pub last_translate: Point,
}

impl DragState {
    /// Start a drag; both anchors are re-captured together so a new drag never
    /// sees a stale start point.
    pub fn begin(&mut self, screen: Point, translate: Point) {
        *self = Self {
            is_dragging: true,
            drag_start: screen,
            last_translate: translate,
        };
    }

    /// Translate that puts the content under `screen` where it was at drag
    /// start, or `None` when no drag is active.
    #[must_use]
    pub fn translate_for(&self, screen: Point) -> Option<Point> {
        self.is_dragging
            .then(|| self.last_translate + (screen - self.drag_start))
    }

    pub fn end(&mut self) {
        self.is_dragging = false;
    }
}
