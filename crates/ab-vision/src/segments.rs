use std::collections::VecDeque;

use ab_capture::Rect;
use tracing::debug;

use crate::grid::SceneGrid;
use crate::quantize::QuantizedColor;

const UNLABELLED: u32 = u32::MAX;

/// Offsets of the 8-connected neighbourhood.
pub(crate) const NEIGHBOURS: [(i32, i32); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (-1, -1),
    (1, -1),
    (1, 1),
    (-1, 1),
];

/// Output of connected-component labelling.
///
/// Segments are addressed by index into the parallel `colours`/`boxes`/`sizes`
/// arrays. Ids follow row-major discovery order and carry no other meaning.
#[derive(Debug, Clone)]
pub struct Segmentation {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    colours: Vec<QuantizedColor>,
    boxes: Vec<Rect>,
    sizes: Vec<u32>,
}

impl Segmentation {
    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }

    /// Segment id owning an in-range pixel.
    pub fn label(&self, x: u32, y: u32) -> usize {
        self.labels[y as usize * self.width as usize + x as usize] as usize
    }

    pub fn colour(&self, id: usize) -> QuantizedColor {
        self.colours[id]
    }

    pub fn bounds(&self, id: usize) -> Rect {
        self.boxes[id]
    }

    /// Number of pixels in a segment.
    pub fn size(&self, id: usize) -> u32 {
        self.sizes[id]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Partition the grid into maximal 8-connected runs of identical colour.
pub fn label_components(grid: &SceneGrid) -> Segmentation {
    let (w, h) = (grid.width(), grid.height());
    let mut labels = vec![UNLABELLED; w as usize * h as usize];
    let mut colours = Vec::new();
    let mut boxes = Vec::new();
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..h {
        for x in 0..w {
            if labels[grid.offset(x, y)] != UNLABELLED {
                continue;
            }

            let id = colours.len() as u32;
            let colour = grid.colour(x, y);
            let mut bounds = Rect::at(x as i32, y as i32);
            let mut size = 1u32;

            labels[grid.offset(x, y)] = id;
            queue.push_back((x as i32, y as i32));

            while let Some((px, py)) = queue.pop_front() {
                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (px + dx, py + dy);
                    if !grid.in_bounds(nx, ny) {
                        continue;
                    }
                    let offset = grid.offset(nx as u32, ny as u32);
                    if labels[offset] != UNLABELLED || grid.colour(nx as u32, ny as u32) != colour
                    {
                        continue;
                    }
                    labels[offset] = id;
                    bounds.add_point(nx, ny);
                    size += 1;
                    queue.push_back((nx, ny));
                }
            }

            colours.push(colour);
            boxes.push(bounds);
            sizes.push(size);
        }
    }

    debug!("Labelled {} segment(s) in {}x{} grid", colours.len(), w, h);

    Segmentation {
        width: w,
        height: h,
        labels,
        colours,
        boxes,
        sizes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_from_rows(rows: &[&[u16]]) -> SceneGrid {
        SceneGrid::from_fn(rows[0].len() as u32, rows.len() as u32, |x, y| {
            QuantizedColor::new(rows[y as usize][x as usize])
        })
    }

    #[test]
    fn test_two_blocks_two_segments() {
        let grid = SceneGrid::from_fn(10, 6, |x, _| {
            QuantizedColor::new(if x < 5 { 1 } else { 2 })
        });
        let seg = label_components(&grid);

        assert_eq!(seg.len(), 2);
        assert_eq!(seg.colour(0).code(), 1);
        assert_eq!(seg.bounds(0), Rect::new(0, 0, 4, 5));
        assert_eq!(seg.bounds(1), Rect::new(5, 0, 4, 5));

        let total: u32 = (0..seg.len()).map(|id| seg.size(id)).sum();
        assert_eq!(total, 60, "every pixel belongs to exactly one segment");
    }

    #[test]
    fn test_diagonal_pixels_connect() {
        let grid = grid_from_rows(&[
            &[7, 0, 0, 0],
            &[0, 7, 0, 0],
            &[0, 0, 7, 0],
            &[0, 0, 0, 3],
        ]);
        let seg = label_components(&grid);

        let diag = seg.label(0, 0);
        assert_eq!(seg.label(2, 2), diag);
        assert_eq!(seg.size(diag), 3);
        assert_eq!(seg.bounds(diag), Rect::new(0, 0, 2, 2));

        // The zeros on both sides of the diagonal touch through the corners
        assert_eq!(seg.label(1, 0), seg.label(0, 1));
        assert_eq!(seg.len(), 3);
    }

    #[test]
    fn test_ids_follow_scan_order() {
        let grid = grid_from_rows(&[&[5, 6], &[6, 5]]);
        let seg = label_components(&grid);
        assert_eq!(seg.label(0, 0), 0);
        assert_eq!(seg.label(1, 0), 1);
        assert_eq!(seg.label(1, 1), 0);
    }
}
