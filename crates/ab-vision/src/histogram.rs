use ab_capture::Rect;

use crate::config::HistogramRule;
use crate::grid::SceneGrid;
use crate::quantize::QuantizedColor;

/// Pixel counts per quantized colour inside a rectangle
#[derive(Debug, Clone)]
pub struct Histogram {
    counts: [u32; QuantizedColor::COUNT],
}

impl Histogram {
    /// Count the colours of `region`, clipped to the grid.
    pub fn of(grid: &SceneGrid, region: &Rect) -> Self {
        let mut counts = [0u32; QuantizedColor::COUNT];
        let clipped = region.crop(grid.width() as i32, grid.height() as i32);
        for y in clipped.y..clipped.bottom() {
            for x in clipped.x..clipped.right() {
                counts[grid.colour(x as u32, y as u32).index()] += 1;
            }
        }
        Self { counts }
    }

    pub fn count(&self, colour: QuantizedColor) -> u32 {
        self.counts[colour.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn counts(&self) -> &[u32; QuantizedColor::COUNT] {
        &self.counts
    }
}

impl HistogramRule {
    /// Whether the histogram of `region` satisfies this rule.
    pub fn holds(&self, hist: &Histogram, region: &Rect) -> bool {
        match *self {
            HistogramRule::Present(colour) => hist.count(colour) > 0,
            HistogramRule::Absent(colour) => hist.count(colour) == 0,
            HistogramRule::Exceeds {
                colour,
                floor,
                area_fraction,
            } => {
                let needed = (floor as f64).max(area_fraction * region.area() as f64);
                hist.count(colour) as f64 > needed
            }
        }
    }
}
