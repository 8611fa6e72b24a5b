use std::collections::BTreeSet;

use ab_capture::{Point, Rect, Screenshot};
use ab_state::ObjectKind;
use tracing::{debug, warn};

use crate::catalog::RegionCatalog;
use crate::classify::classify;
use crate::config::VisionConfig;
use crate::grid::SceneGrid;
use crate::histogram::Histogram;
use crate::parabola::{self, ParabolaFit, TrainingWindow};
use crate::quantize::{Palette, QuantizedColor};
use crate::region_finder;
use crate::slingshot;
use crate::trajectory;

/// All detectors over one screenshot.
///
/// The grid and segment catalog are built once up front and only read
/// afterwards, so finders may run concurrently on a shared `&Vision`.
#[derive(Debug, Clone)]
pub struct Vision {
    grid: SceneGrid,
    catalog: RegionCatalog,
    config: VisionConfig,
}

impl Vision {
    pub fn new(shot: &Screenshot) -> Self {
        Self::with_config(shot, VisionConfig::default())
    }

    pub fn with_config(shot: &Screenshot, config: VisionConfig) -> Self {
        Self::from_grid(SceneGrid::new(shot), config)
    }

    pub(crate) fn from_grid(grid: SceneGrid, config: VisionConfig) -> Self {
        let catalog = RegionCatalog::build(&grid);
        debug!(
            "Vision ready: {}x{} frame, {} segment(s)",
            grid.width(),
            grid.height(),
            catalog.len()
        );
        Self {
            grid,
            catalog,
            config,
        }
    }

    pub fn grid(&self) -> &SceneGrid {
        &self.grid
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Aiming rectangle around the slingshot and the bird on it.
    pub fn find_slingshot(&self) -> Option<Rect> {
        slingshot::find_slingshot(&self.grid, &self.config.slingshot, &self.config.regions)
    }

    /// Detections of one kind. Kinds without a configured profile yield nothing.
    pub fn find_objects(&self, kind: ObjectKind) -> Vec<Rect> {
        if kind == ObjectKind::Slingshot {
            return self.find_slingshot().into_iter().collect();
        }
        if let Some(profile) = self.config.object(kind) {
            return classify(&self.grid, &self.catalog, profile);
        }
        if let Some(block) = self.config.block(kind) {
            let found =
                region_finder::find_regions_default(&self.grid, &block.palette, &self.config.regions);
            debug!("{:?}: {} region(s)", kind, found.len());
            return found;
        }
        warn!("No detection profile configured for {:?}", kind);
        Vec::new()
    }

    pub fn find_pigs(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::Pig)
    }

    pub fn find_red_birds(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::RedBird)
    }

    pub fn find_blue_birds(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::BlueBird)
    }

    pub fn find_yellow_birds(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::YellowBird)
    }

    pub fn find_white_birds(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::WhiteBird)
    }

    pub fn find_black_birds(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::BlackBird)
    }

    pub fn find_tnts(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::Tnt)
    }

    pub fn find_wood(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::Wood)
    }

    pub fn find_stones(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::Stone)
    }

    pub fn find_ice(&self) -> Vec<Rect> {
        self.find_objects(ObjectKind::Ice)
    }

    /// Trajectory markers left by the previous shot, outliers removed.
    pub fn find_trajectory_points(&self) -> Vec<Point> {
        let sling = self.find_slingshot();
        self.find_trajectory_points_near(sling.as_ref())
    }

    /// Same as [`Vision::find_trajectory_points`] with a slingshot already located.
    pub fn find_trajectory_points_near(&self, sling: Option<&Rect>) -> Vec<Point> {
        trajectory::find_trajectory(&self.grid, &self.config.trajectory, sling)
    }

    /// Fit the arc through `points`, training on the window set by the slingshot.
    pub fn fit_parabola(&self, points: &[Point]) -> ParabolaFit {
        let sling = self.find_slingshot();
        self.fit_parabola_near(points, sling.as_ref())
    }

    pub fn fit_parabola_near(&self, points: &[Point], sling: Option<&Rect>) -> ParabolaFit {
        let window =
            TrainingWindow::for_frame(self.grid.width() as i32, self.grid.height() as i32, sling);
        parabola::fit_parabola(points, &window, self.config.trajectory.training_size)
    }

    /// Region search with the standard area and HUD rules.
    pub fn find_regions(&self, palette: &Palette) -> Vec<Rect> {
        region_finder::find_regions_default(&self.grid, palette, &self.config.regions)
    }

    pub fn find_colour(&self, colour: QuantizedColor) -> Vec<Rect> {
        self.catalog.find_colour(colour)
    }

    pub fn query_point(&self, p: Point) -> Option<QuantizedColor> {
        self.catalog.query_point(p)
    }

    pub fn query_rect(&self, region: &Rect) -> BTreeSet<QuantizedColor> {
        self.catalog.query_rect(region)
    }

    pub fn histogram(&self, region: &Rect) -> Histogram {
        Histogram::of(&self.grid, region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    const SKY: u16 = 100;

    fn pixel(code: u16) -> Rgba<u8> {
        let [r, g, b] = QuantizedColor::new(code).representative_rgb();
        Rgba([r, g, b, 255])
    }

    /// An 840x480 screenshot painted with `paint`, sky elsewhere.
    fn screenshot<F>(paint: F) -> Screenshot
    where
        F: Fn(u32, u32) -> Option<u16>,
    {
        let img = RgbaImage::from_fn(840, 480, |x, y| pixel(paint(x, y).unwrap_or(SKY)));
        Screenshot::from_image(img).unwrap()
    }

    fn sling_v(x: u32, y: u32) -> Option<u16> {
        if !(250..=320).contains(&y) {
            return None;
        }
        let shift = (y - 250) * 3 / 7;
        let (left, right) = (400 + shift, 460 - shift);
        if (left..=left + 6).contains(&x) || (right - 6..=right).contains(&x) {
            Some(345)
        } else if (425..=434).contains(&x) && (260..=263).contains(&y) {
            Some(64)
        } else {
            None
        }
    }

    #[test]
    fn test_slingshot_end_to_end() {
        let vision = Vision::new(&screenshot(sling_v));
        let sling = vision.find_slingshot().expect("slingshot should be found");

        assert!(
            sling.contains_rect(&Rect::new(400, 250, 60, 70)),
            "aiming box {:?} must enclose the V",
            sling
        );
        assert_eq!(sling, Rect::new(394, 227, 72, 93));
        assert_eq!(vision.find_objects(ObjectKind::Slingshot), vec![sling]);
    }

    #[test]
    fn test_adjacent_pigs_merge() {
        let shot = screenshot(|x, y| {
            let in_y = (300..=309).contains(&y);
            if in_y && ((400..=409).contains(&x) || (412..=421).contains(&x)) {
                Some(376)
            } else if (425..=430).contains(&x) && (300..=305).contains(&y) {
                Some(250)
            } else {
                None
            }
        });
        let vision = Vision::new(&shot);
        assert_eq!(vision.find_pigs(), vec![Rect::new(389, 295, 43, 19)]);
    }

    #[test]
    fn test_blank_frame_is_empty() {
        let vision = Vision::new(&screenshot(|_, _| None));
        for kind in vision.config().kinds() {
            assert!(vision.find_objects(kind).is_empty(), "{:?} on a blank frame", kind);
        }
        assert_eq!(vision.find_slingshot(), None);
        assert!(vision.find_trajectory_points().is_empty());
        assert!(vision.fit_parabola(&[]).is_degenerate());
        assert_eq!(vision.catalog().len(), 1);
    }

    #[test]
    fn test_blocks_use_region_search() {
        let shot = screenshot(|x, y| {
            let plank = (500..=560).contains(&x) && (350..=355).contains(&y);
            let grain = (530..=560).contains(&x) && (356..=360).contains(&y);
            if plank {
                Some(408)
            } else if grain {
                Some(481)
            } else if (600..=620).contains(&x) && (300..=340).contains(&y) {
                Some(183)
            } else {
                None
            }
        });
        let vision = Vision::new(&shot);
        assert_eq!(vision.find_wood(), vec![Rect::new(500, 350, 60, 10)]);
        assert_eq!(vision.find_ice(), vec![Rect::new(600, 300, 20, 40)]);
        assert!(vision.find_stones().is_empty());
    }

    #[test]
    fn test_queries() {
        let shot = screenshot(|x, y| {
            ((10..20).contains(&x) && (100..110).contains(&y)).then_some(365)
        });
        let vision = Vision::new(&shot);
        let stone = QuantizedColor::new(365);

        assert_eq!(vision.query_point(Point::new(12, 105)), Some(stone));
        assert_eq!(vision.query_point(Point::new(900, 5)), None);
        assert_eq!(vision.find_colour(stone), vec![Rect::new(10, 100, 9, 9)]);
        assert_eq!(
            vision.query_rect(&Rect::new(0, 90, 40, 40)),
            BTreeSet::from([stone])
        );
        assert_eq!(vision.histogram(&Rect::new(10, 100, 10, 10)).count(stone), 100);
    }

    #[test]
    fn test_missing_profile_finds_nothing() {
        let mut config = VisionConfig::default();
        config.objects.retain(|p| p.kind != ObjectKind::Pig);
        let shot = screenshot(|x, y| {
            ((400..=409).contains(&x) && (300..=309).contains(&y)).then_some(376)
        });
        let vision = Vision::with_config(&shot, config);
        assert!(vision.find_pigs().is_empty());
    }
}
