// Two-finger pinch state
use crate::model::Point;

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PinchState {
    /// Distance between the two touches at the previous pinch event.
    pub start_distance: Option<f64>,
}

impl PinchState {
    pub fn begin(&mut self, a: Point, b: Point) {
        self.start_distance = Some(a.distance(b));
    }

    /// Scale ratio since the previous pinch event; records the new distance so
    /// successive ratios compose. `None` when no pinch is in progress or either
    /// distance is degenerate.
    pub fn advance(&mut self, a: Point, b: Point) -> Option<f64> {
        let start = self.start_distance?;
        let current = a.distance(b);
        if !(current.is_finite() && current > 0.0) {
            return None;
        }
        self.start_distance = Some(current);
        (start.is_finite() && start > 0.0).then(|| current / start)
    }

    pub fn end(&mut self) {
        self.start_distance = None;
    }
}
