use serde::{Deserialize, Serialize};

/// Integer pixel coordinate in frame space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned integer rectangle in frame space.
///
/// Follows AWT rectangle semantics, which the game calibration was tuned against:
/// a region grown pixel by pixel starts as `(x, y, 0, 0)` and each added pixel extends
/// the far edge to that pixel, so `width == max_x - min_x`. A single pixel has area 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero-sized rectangle anchored at a seed pixel.
    pub const fn at(x: i32, y: i32) -> Self {
        Self::new(x, y, 0, 0)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Geometric centre, in fractional pixels.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Centre truncated to integer pixels.
    pub fn center_point(&self) -> Point {
        let (cx, cy) = self.center();
        Point::new(cx as i32, cy as i32)
    }

    /// Grow the rectangle so its span reaches `(px, py)`.
    pub fn add_point(&mut self, px: i32, py: i32) {
        let x1 = self.x.min(px);
        let y1 = self.y.min(py);
        let x2 = self.right().max(px);
        let y2 = self.bottom().max(py);
        *self = Self::new(x1, y1, x2 - x1, y2 - y1);
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Overlap test on half-open extents. Degenerate rectangles never intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Half-open point containment.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.y >= self.y && p.x < self.right() && p.y < self.bottom()
    }

    /// Whole-rectangle containment. Any zero or negative dimension on either side fails.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Expand by `dx` on the left and right and `dy` on the top and bottom.
    pub fn dilate(&self, dx: i32, dy: i32) -> Rect {
        Self::new(
            self.x - dx,
            self.y - dy,
            self.width + 2 * dx,
            self.height + 2 * dy,
        )
    }

    /// Clip to the `[0, width) x [0, height)` frame.
    pub fn crop(&self, width: i32, height: i32) -> Rect {
        let x1 = self.x.clamp(0, width);
        let y1 = self.y.clamp(0, height);
        let x2 = self.right().clamp(x1, width);
        let y2 = self.bottom().clamp(y1, height);
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }
}
