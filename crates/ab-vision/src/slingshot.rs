use ab_capture::Rect;
use tracing::debug;

use crate::config::{RegionRules, SlingshotProfile};
use crate::grid::SceneGrid;
use crate::histogram::Histogram;
use crate::region_finder::find_regions_default;

/// Locate the slingshot and return an aiming rectangle that also covers the
/// bird resting in it. Only the first accepted candidate is returned.
pub fn find_slingshot(
    grid: &SceneGrid,
    profile: &SlingshotProfile,
    rules: &RegionRules,
) -> Option<Rect> {
    let candidates = find_regions_default(grid, &profile.palette, rules);
    debug!("Slingshot: {} candidate region(s)", candidates.len());

    for candidate in candidates {
        let hist = Histogram::of(grid, &candidate);

        let mut sling = candidate;
        if sling.height > profile.trim_min_height {
            // The first left column is measured at the untrimmed height
            let first_column = backdrop_count(grid, sling.x, &sling, profile);
            trim_shelf(grid, &mut sling, profile);
            trim_backdrop_left(grid, &mut sling, first_column, profile);
            trim_backdrop_right(grid, &mut sling, profile);
        }

        if sling.width > sling.height {
            debug!("  Candidate {:?} rejected: wider than tall", sling);
            continue;
        }

        if profile.evidence.iter().all(|rule| rule.holds(&hist, &sling)) {
            let aim = aiming_extension(&sling);
            debug!("  Slingshot accepted at {:?}, aiming box {:?}", sling, aim);
            return Some(aim);
        }
    }

    None
}

/// Cut off a shelf fused under the sling: when the top-left corner shows a shelf
/// marker colour, the sling ends at the first sling-coloured pixel in that column.
fn trim_shelf(grid: &SceneGrid, sling: &mut Rect, profile: &SlingshotProfile) {
    let Some(corner) = grid.get(sling.x, sling.y) else {
        return;
    };
    if !profile.shelf_markers.contains(corner) {
        return;
    }

    for y in sling.y..sling.bottom() {
        let hit = grid
            .get(sling.x, y)
            .is_some_and(|c| profile.palette.contains(c));
        if hit {
            sling.height = y - sling.y;
            break;
        }
    }
}

fn backdrop_count(grid: &SceneGrid, x: i32, sling: &Rect, profile: &SlingshotProfile) -> u32 {
    let column = Rect::new(x, sling.y, 1, sling.height);
    Histogram::of(grid, &column).count(profile.backdrop)
}

fn is_backdrop(count: u32, sling: &Rect, profile: &SlingshotProfile) -> bool {
    count as f64 >= sling.height as f64 * profile.backdrop_fraction
}

/// Step the left edge right while the column under test is mostly backdrop.
/// After each step the column one past the new edge is tested, so a single
/// backdrop column stays in front of the sling.
fn trim_backdrop_left(
    grid: &SceneGrid,
    sling: &mut Rect,
    first_column: u32,
    profile: &SlingshotProfile,
) {
    let mut count = first_column;
    while sling.width > 0 && is_backdrop(count, sling, profile) {
        sling.x += 1;
        sling.width -= 1;
        count = backdrop_count(grid, sling.x + 1, sling, profile);
    }
}

fn trim_backdrop_right(grid: &SceneGrid, sling: &mut Rect, profile: &SlingshotProfile) {
    while sling.width > 0
        && sling.height > profile.trim_min_height
        && is_backdrop(backdrop_count(grid, sling.right(), sling, profile), sling, profile)
    {
        sling.width -= 1;
    }
}

/// Extend left by a tenth of the width and up by a third of the height.
fn aiming_extension(sling: &Rect) -> Rect {
    let (w, h) = (sling.width, sling.height);
    sling.union(&Rect::new(sling.x - w / 10, sling.y - h / 3, w / 10 * 12, h / 3 * 4))
}
