use ab_capture::Rect;
use tracing::debug;

use crate::catalog::RegionCatalog;
use crate::config::{Evidence, ObjectProfile};
use crate::grid::SceneGrid;
use crate::histogram::Histogram;

/// Detect every object matching `profile`.
///
/// Each not-yet-merged segment of the primary colour seeds a candidate. Its box
/// is dilated, later segments of the merge palette whose own dilated boxes touch
/// it are folded in (and skipped as future seeds), and the result must then
/// show the profile's secondary evidence and pass its shape filters.
pub fn classify(grid: &SceneGrid, catalog: &RegionCatalog, profile: &ObjectProfile) -> Vec<Rect> {
    let (w, h) = (grid.width() as i32, grid.height() as i32);
    let mut ignored = catalog.ignore_set();
    let mut found = Vec::new();
    let mut seeds = 0usize;

    for seed in 0..catalog.len() {
        if catalog.colour(seed) != profile.primary || ignored.contains(seed) {
            continue;
        }
        seeds += 1;

        let seed_box = catalog.bounds(seed);
        let mut bounds = profile.seed_margin.apply(&seed_box);
        let mut object = seed_box;

        for other in seed + 1..catalog.len() {
            if !profile.merge_palette.contains(catalog.colour(other)) {
                continue;
            }
            let other_box = catalog.bounds(other);
            let grown = profile.merge_margin.apply(&other_box);
            if bounds.intersects(&grown) {
                bounds = bounds.union(&grown);
                object = object.union(&other_box);
                ignored.insert(other);
            }
        }

        if let Some(margin) = profile.suppress_margin {
            for other in seed + 1..catalog.len() {
                if catalog.colour(other) == profile.primary
                    && bounds.intersects(&margin.apply(&catalog.bounds(other)))
                {
                    ignored.insert(other);
                }
            }
        }

        match &profile.evidence {
            Evidence::Overlap { palette, absorb } => {
                let mut confirmed = false;
                for other in 0..catalog.len() {
                    if !palette.contains(catalog.colour(other)) {
                        continue;
                    }
                    let other_box = catalog.bounds(other);
                    if bounds.intersects(&other_box) {
                        confirmed = true;
                        if !absorb {
                            break;
                        }
                        object = object.union(&other_box);
                    }
                }
                if !confirmed {
                    continue;
                }
                if let Some(region) = finish(profile, object, w, h) {
                    found.push(region);
                }
            }
            Evidence::Histogram { rules } => {
                let Some(region) = finish(profile, object, w, h) else {
                    continue;
                };
                let hist = Histogram::of(grid, &region);
                if rules.iter().all(|rule| rule.holds(&hist, &region)) {
                    found.push(region);
                }
            }
        }
    }

    debug!(
        "{:?}: {} seed(s) of colour {}, {} accepted",
        profile.kind,
        seeds,
        profile.primary.code(),
        found.len()
    );
    found
}

/// Final dilation, shape filters and crop to the frame.
fn finish(profile: &ObjectProfile, object: Rect, w: i32, h: i32) -> Option<Rect> {
    let grown = match profile.final_margin {
        Some(margin) => margin.apply(&object),
        None => object,
    };
    if !profile.geometry.iter().all(|g| g.admits(&grown)) {
        return None;
    }
    Some(grown.crop(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisionConfig;
    use crate::quantize::QuantizedColor;
    use ab_state::ObjectKind;

    const SKY: u16 = 100;

    /// Paint filled rectangles (inclusive pixel ranges) onto a sky background.
    fn scene(blocks: &[(u16, (u32, u32), (u32, u32))]) -> (SceneGrid, RegionCatalog) {
        let grid = SceneGrid::from_fn(840, 480, |x, y| {
            let code = blocks
                .iter()
                .rev()
                .find(|(_, (x0, x1), (y0, y1))| x >= *x0 && x <= *x1 && y >= *y0 && y <= *y1)
                .map(|(code, _, _)| *code)
                .unwrap_or(SKY);
            QuantizedColor::new(code)
        });
        let catalog = RegionCatalog::build(&grid);
        (grid, catalog)
    }

    fn run(kind: ObjectKind, grid: &SceneGrid, catalog: &RegionCatalog) -> Vec<Rect> {
        let config = VisionConfig::default();
        classify(grid, catalog, config.object(kind).unwrap())
    }

    #[test]
    fn test_pig_blobs_merge_into_one() {
        let (grid, catalog) = scene(&[
            (376, (400, 409), (300, 309)),
            (376, (412, 421), (300, 309)),
            (250, (425, 430), (300, 305)),
        ]);
        let pigs = run(ObjectKind::Pig, &grid, &catalog);
        assert_eq!(pigs, vec![Rect::new(389, 295, 43, 19)]);
    }

    #[test]
    fn test_pig_needs_secondary_colour() {
        let (grid, catalog) = scene(&[(376, (400, 409), (300, 309))]);
        assert!(run(ObjectKind::Pig, &grid, &catalog).is_empty());
    }

    #[test]
    fn test_red_bird_absorbs_eye() {
        let (grid, catalog) = scene(&[
            (385, (300, 309), (200, 209)),
            (488, (305, 308), (203, 206)),
        ]);
        let birds = run(ObjectKind::RedBird, &grid, &catalog);
        assert_eq!(birds, vec![Rect::new(300, 200, 9, 9)]);
    }

    #[test]
    fn test_blue_bird() {
        let (grid, catalog) = scene(&[
            (238, (100, 107), (300, 307)),
            (488, (103, 104), (303, 304)),
        ]);
        assert_eq!(
            run(ObjectKind::BlueBird, &grid, &catalog),
            vec![Rect::new(100, 300, 7, 7)]
        );

        let (grid, catalog) = scene(&[(238, (100, 107), (300, 307))]);
        assert!(run(ObjectKind::BlueBird, &grid, &catalog).is_empty());
    }

    #[test]
    fn test_blue_bird_suppresses_later_body() {
        // The second body is too far for the merge pass, but the beak joined
        // after it stretches the bounds over it, so it is only skipped
        let (grid, catalog) = scene(&[
            (238, (100, 107), (300, 307)),
            (488, (103, 104), (303, 304)),
            (238, (125, 128), (300, 303)),
            (165, (109, 122), (305, 306)),
        ]);
        let birds = run(ObjectKind::BlueBird, &grid, &catalog);

        assert_eq!(birds, vec![Rect::new(100, 300, 22, 7)]);
        assert!(
            !birds[0].intersects(&Rect::new(125, 300, 3, 3)),
            "suppressed body must not be absorbed"
        );
    }

    #[test]
    fn test_yellow_bird_histogram_confirmation() {
        let (grid, catalog) = scene(&[
            (497, (500, 511), (150, 161)),
            (288, (503, 505), (153, 155)),
        ]);
        assert_eq!(
            run(ObjectKind::YellowBird, &grid, &catalog),
            vec![Rect::new(498, 148, 15, 15)]
        );

        let (grid, catalog) = scene(&[(497, (500, 511), (150, 161))]);
        assert!(run(ObjectKind::YellowBird, &grid, &catalog).is_empty());
    }

    #[test]
    fn test_white_bird_vertical_band() {
        let (grid, catalog) = scene(&[
            // inside the band
            (490, (600, 611), (200, 211)),
            (508, (603, 604), (203, 204)),
            (510, (607, 608), (207, 208)),
            // same bird drawn in the sky strip
            (490, (300, 311), (20, 31)),
            (508, (303, 304), (23, 24)),
            (510, (307, 308), (27, 28)),
        ]);
        assert_eq!(
            run(ObjectKind::WhiteBird, &grid, &catalog),
            vec![Rect::new(598, 198, 15, 15)]
        );
    }

    #[test]
    fn test_black_bird_rejects_red_contamination() {
        let bird = [
            (488, (200, 219), (300, 319)),
            (0, (202, 211), (302, 311)),
            (64, (214, 215), (314, 315)),
        ];
        let (grid, catalog) = scene(&bird);
        assert_eq!(
            run(ObjectKind::BlackBird, &grid, &catalog),
            vec![Rect::new(198, 298, 23, 23)]
        );

        let mut tainted = bird.to_vec();
        tainted.push((385, (216, 217), (302, 303)));
        let (grid, catalog) = scene(&tainted);
        assert!(run(ObjectKind::BlackBird, &grid, &catalog).is_empty());
    }

    #[test]
    fn test_tnt_needs_both_secondaries() {
        let crate_with = |extra: &[(u16, (u32, u32), (u32, u32))]| {
            let mut blocks = vec![(410, (700, 719), (400, 419))];
            blocks.extend_from_slice(extra);
            scene(&blocks)
        };

        let (grid, catalog) = crate_with(&[
            (457, (703, 706), (403, 406)),
            (511, (710, 713), (410, 413)),
        ]);
        assert_eq!(
            run(ObjectKind::Tnt, &grid, &catalog),
            vec![Rect::new(698, 398, 23, 23)]
        );

        let (grid, catalog) = crate_with(&[(457, (703, 706), (403, 406))]);
        assert!(run(ObjectKind::Tnt, &grid, &catalog).is_empty());
    }

    #[test]
    fn test_crops_to_frame() {
        let (grid, catalog) = scene(&[
            (497, (0, 9), (470, 479)),
            (288, (3, 4), (473, 474)),
        ]);
        let birds = run(ObjectKind::YellowBird, &grid, &catalog);
        assert_eq!(birds, vec![Rect::new(0, 468, 11, 12)]);
    }
}
