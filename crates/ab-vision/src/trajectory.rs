use ab_capture::{Point, Rect};
use tracing::debug;

use crate::config::TrajectoryProfile;
use crate::grid::SceneGrid;
use crate::parabola::{fit_parabola, ParabolaFit, TrainingWindow};
use crate::region_finder::find_regions;

/// Centroids of every marker-coloured region small enough to be a trajectory dot.
pub fn marker_centroids(grid: &SceneGrid, profile: &TrajectoryProfile) -> Vec<Point> {
    find_regions(grid, &profile.palette, |r| r.area() <= profile.max_marker_area)
        .iter()
        .map(Rect::center_point)
        .collect()
}

/// Drop markers too far from the fitted curve and those drawn over the menu.
pub fn filter_markers(points: &[Point], fit: &ParabolaFit, profile: &TrajectoryProfile) -> Vec<Point> {
    let curve = fit.coefficients();
    points
        .iter()
        .copied()
        .filter(|p| (p.y as f64 - curve.y_at(p.x as f64)).abs() <= profile.max_residual)
        .filter(|p| !profile.menu.contains_point(*p))
        .collect()
}

/// Trajectory markers that agree with the parabola through them.
///
/// The fit is trained with the window chosen by the slingshot position. A
/// degenerate fit leaves only the markers that lie on `y = 0`.
pub fn find_trajectory(
    grid: &SceneGrid,
    profile: &TrajectoryProfile,
    sling: Option<&Rect>,
) -> Vec<Point> {
    let markers = marker_centroids(grid, profile);
    let window = TrainingWindow::for_frame(grid.width() as i32, grid.height() as i32, sling);
    let fit = fit_parabola(&markers, &window, profile.training_size);
    let kept = filter_markers(&markers, &fit, profile);
    debug!("Trajectory: {} marker(s), {} kept", markers.len(), kept.len());
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VisionConfig;
    use crate::quantize::QuantizedColor;
    use ab_state::Trajectory;

    fn curve_y(x: i32) -> i32 {
        (x * x) / 100 - 8 * x + 1800
    }

    /// 3x3 dots of marker colour on the curve, one stray dot and a large block.
    fn marker_grid() -> SceneGrid {
        SceneGrid::from_fn(840, 480, |x, y| {
            let (x, y) = (x as i32, y as i32);
            let on_curve = (320..=480).step_by(10).any(|cx| {
                let cy = curve_y(cx);
                (x - cx).abs() <= 1 && (y - cy).abs() <= 1
            });
            let stray = (x - 600).abs() <= 1 && (y - 100).abs() <= 1;
            let block = (700..720).contains(&x) && (400..420).contains(&y);
            QuantizedColor::new(if on_curve || stray || block { 365 } else { 100 })
        })
    }

    #[test]
    fn test_centroids_skip_large_regions() {
        let profile = VisionConfig::default().trajectory;
        let points = marker_centroids(&marker_grid(), &profile);
        assert_eq!(points.len(), 18, "17 curve dots and the stray one");
        assert!(points.contains(&Point::new(400, 200)));
        assert!(points.contains(&Point::new(600, 100)));
        assert!(!points.iter().any(|p| p.x >= 700));
    }

    #[test]
    fn test_outlier_removed() {
        let profile = VisionConfig::default().trajectory;
        let kept = find_trajectory(&marker_grid(), &profile, None);
        assert_eq!(kept.len(), 17);
        assert!(!kept.contains(&Point::new(600, 100)), "stray dot is off the curve");
    }

    #[test]
    fn test_filter_by_residual_and_menu() {
        let profile = VisionConfig::default().trajectory;
        let flat = ParabolaFit::Fitted(Trajectory {
            w0: 0.0,
            w1: 0.0,
            w2: 30.0,
        });
        let points = [Point::new(100, 30), Point::new(300, 30), Point::new(300, 50)];
        let kept = filter_markers(&points, &flat, &profile);
        assert_eq!(kept, vec![Point::new(300, 30)]);
    }

    #[test]
    fn test_empty_grid_has_no_trajectory() {
        let profile = VisionConfig::default().trajectory;
        let grid = SceneGrid::from_fn(840, 480, |_, _| QuantizedColor::new(100));
        assert!(find_trajectory(&grid, &profile, None).is_empty());
    }
}
