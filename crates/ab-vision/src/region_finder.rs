use std::collections::VecDeque;

use ab_capture::Rect;
use tracing::debug;

use crate::config::RegionRules;
use crate::grid::SceneGrid;
use crate::quantize::Palette;
use crate::segments::NEIGHBOURS;

/// Bounding boxes of every maximal 8-connected area whose pixels are all in
/// `palette`, keeping those that `admit` accepts.
///
/// Unlike segment labelling, neighbouring pixels only need to share the palette,
/// not the exact colour. Each pixel is visited at most once per call.
pub fn find_regions<F>(grid: &SceneGrid, palette: &Palette, admit: F) -> Vec<Rect>
where
    F: Fn(&Rect) -> bool,
{
    let (w, h) = (grid.width(), grid.height());
    let admissible = palette.mask();
    let mut visited = vec![false; w as usize * h as usize];
    let mut queue = VecDeque::new();
    let mut regions = Vec::new();
    let mut rejected = 0usize;

    for y in 0..h {
        for x in 0..w {
            let offset = grid.offset(x, y);
            if visited[offset] || !admissible[grid.colour(x, y).index()] {
                continue;
            }

            visited[offset] = true;
            queue.push_back((x as i32, y as i32));
            let mut bounds = Rect::at(x as i32, y as i32);

            while let Some((px, py)) = queue.pop_front() {
                for (dx, dy) in NEIGHBOURS {
                    let (nx, ny) = (px + dx, py + dy);
                    if !grid.in_bounds(nx, ny) {
                        continue;
                    }
                    let offset = grid.offset(nx as u32, ny as u32);
                    if visited[offset] || !admissible[grid.colour(nx as u32, ny as u32).index()] {
                        continue;
                    }
                    visited[offset] = true;
                    bounds.add_point(nx, ny);
                    queue.push_back((nx, ny));
                }
            }

            if admit(&bounds) {
                regions.push(bounds);
            } else {
                rejected += 1;
            }
        }
    }

    debug!(
        "Region search over {} colour(s): {} kept, {} rejected",
        palette.colours().len(),
        regions.len(),
        rejected
    );
    regions
}

/// Region search with the standard area and HUD rules.
pub fn find_regions_default(grid: &SceneGrid, palette: &Palette, rules: &RegionRules) -> Vec<Rect> {
    find_regions(grid, palette, |r| rules.admits(r))
}
