use std::collections::BTreeSet;

use ab_capture::{Point, Rect};
use tracing::error;

use crate::grid::SceneGrid;
use crate::quantize::QuantizedColor;
use crate::segments::{label_components, Segmentation};

/// Read-only lookup over the labelled segments of one screenshot
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    segments: Segmentation,
}

impl RegionCatalog {
    pub fn build(grid: &SceneGrid) -> Self {
        Self {
            segments: label_components(grid),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn colour(&self, id: usize) -> QuantizedColor {
        self.segments.colour(id)
    }

    pub fn bounds(&self, id: usize) -> Rect {
        self.segments.bounds(id)
    }

    pub fn segments(&self) -> &Segmentation {
        &self.segments
    }

    /// A fresh, all-clear skip set sized to this catalog.
    pub fn ignore_set(&self) -> SegmentMask {
        SegmentMask::new(self.len())
    }

    /// Bounding boxes of every segment with exactly this colour.
    pub fn find_colour(&self, colour: QuantizedColor) -> Vec<Rect> {
        (0..self.len())
            .filter(|&id| self.colour(id) == colour)
            .map(|id| self.bounds(id))
            .collect()
    }

    /// Colour of the segment under a pixel. Out-of-range points are reported and yield `None`.
    pub fn query_point(&self, p: Point) -> Option<QuantizedColor> {
        let (w, h) = (self.segments.width(), self.segments.height());
        if p.x < 0 || p.y < 0 || p.x as u32 >= w || p.y as u32 >= h {
            error!("pixel ({}, {}) is out of range", p.x, p.y);
            return None;
        }
        let id = self.segments.label(p.x as u32, p.y as u32);
        Some(self.colour(id))
    }

    /// Colours of all segments whose boxes lie entirely inside `region`.
    pub fn query_rect(&self, region: &Rect) -> BTreeSet<QuantizedColor> {
        (0..self.len())
            .filter(|&id| region.contains_rect(&self.bounds(id)))
            .map(|id| self.colour(id))
            .collect()
    }
}

/// Per-call set of segments already merged into another object
#[derive(Debug, Clone)]
pub struct SegmentMask {
    bits: Vec<bool>,
}

impl SegmentMask {
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![false; len],
        }
    }

    pub fn insert(&mut self, id: usize) {
        self.bits[id] = true;
    }

    pub fn contains(&self, id: usize) -> bool {
        self.bits[id]
    }
}
