//! Core data models for the pixel inspector.
//! A decoded bitmap is turned into a grid of immutable cells once at startup;
//! everything else only reads it.

use crate::error::ViewerError;

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

/// A continuous point, used both for screen space and for grid space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Integer grid coordinates of a cell, 0-based from the top-left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque CSS color; alpha is dropped so cells always draw at full opacity.
    #[must_use]
    pub fn css_rgb(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn css_rgba(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.2})",
            self.r,
            self.g,
            self.b,
            f64::from(self.a) / 255.0
        )
    }

    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// One source-image pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub position: Position,
    pub color: Color,
}

/// Decoded RGBA samples, row-major, four bytes per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Wrap a sample buffer; its length must be exactly `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ViewerError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(ViewerError::BitmapSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Sample at `(x, y)`; callers stay within `width` x `height`.
    fn sample(&self, x: u32, y: u32) -> Color {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Color::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        )
    }
}

/// Row-major grid of cells. Invariant: `rows[y][x].position == {x, y}`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Length of row `y`, or 0 when the row does not exist.
    #[must_use]
    pub fn column_count(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Vec::len)
    }

    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.rows.iter().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// Build the cell grid for `bitmap`: `height` rows of `width` cells.
#[must_use]
pub fn build_grid(bitmap: &Bitmap) -> Grid {
    let rows = (0..bitmap.height())
        .map(|y| {
            (0..bitmap.width())
                .map(|x| Cell {
                    position: Position { x, y },
                    color: bitmap.sample(x, y),
                })
                .collect()
        })
        .collect();
    Grid { rows }
}
