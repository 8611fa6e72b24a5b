use ab_capture::{Rect, Screenshot};
use tracing::error;

use crate::quantize::QuantizedColor;

/// Per-pixel quantized colours of one screenshot.
#[derive(Debug, Clone)]
pub struct SceneGrid {
    width: u32,
    height: u32,
    cells: Vec<QuantizedColor>,
}

impl SceneGrid {
    /// Quantize every pixel of a screenshot.
    pub fn new(shot: &Screenshot) -> Self {
        Self::from_fn(shot.width(), shot.height(), |x, y| {
            QuantizedColor::from_rgb(shot.rgb(x, y))
        })
    }

    pub(crate) fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> QuantizedColor,
    {
        let mut cells = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                cells.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Colour at an in-range pixel.
    pub fn colour(&self, x: u32, y: u32) -> QuantizedColor {
        self.cells[self.offset(x, y)]
    }

    /// Checked lookup. Out-of-range queries are reported and yield `None`.
    pub fn get(&self, x: i32, y: i32) -> Option<QuantizedColor> {
        if !self.in_bounds(x, y) {
            error!("pixel ({}, {}) is out of range", x, y);
            return None;
        }
        Some(self.colour(x as u32, y as u32))
    }

    pub(crate) fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
