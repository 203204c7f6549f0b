// Viewport transform: screen = world * scale + translate, where world units are
// unscaled canvas units (one cell spans PIXEL_SIZE of them).
use crate::config::{MAX_SCALE, MIN_SCALE};
use crate::model::Point;

#[cfg(test)]
#[path = "camera_test.rs"]
mod camera_test;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Always > 0.
    pub scale: f64,
    pub translate: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Point::default(),
        }
    }
}

impl ViewportState {
    #[must_use]
    pub fn screen_to_world(&self, screen: Point) -> Point {
        (screen - self.translate) * (1.0 / self.scale)
    }

    #[must_use]
    pub fn world_to_screen(&self, world: Point) -> Point {
        world * self.scale + self.translate
    }

    /// Multiply the scale by `factor`, keeping the screen point `anchor` fixed.
    ///
    /// Factors that are not positive and finite are ignored, as are steps
    /// that would leave `[MIN_SCALE, MAX_SCALE]`. Returns whether the
    /// transform changed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let Some(scale) = self.scaled_by(factor) else {
            return false;
        };
        let translate = self.translate - (anchor - self.translate) * (factor - 1.0);
        if !(translate.x.is_finite() && translate.y.is_finite()) {
            return false;
        }
        self.scale = scale;
        self.translate = translate;
        true
    }

    /// Multiply the scale by `factor` without moving the translate.
    pub fn zoom_origin(&mut self, factor: f64) -> bool {
        match self.scaled_by(factor) {
            Some(scale) => {
                self.scale = scale;
                true
            }
            None => false,
        }
    }

    fn scaled_by(&self, factor: f64) -> Option<f64> {
        if !(factor.is_finite() && factor > 0.0) {
            return None;
        }
        let scale = self.scale * factor;
        (MIN_SCALE..=MAX_SCALE).contains(&scale).then_some(scale)
    }
}
