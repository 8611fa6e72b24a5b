//! Least-squares fit of `y = w0*x^2 + w1*x + w2` to trajectory markers.

use ab_capture::{Point, Rect};
use ab_state::Trajectory;
use nalgebra::{Matrix3, Vector3};
use tracing::{debug, warn};

/// Which marker points may train the fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrainingWindow {
    /// No slingshot: central third of the frame width, upper three fifths of its height.
    Centre { width: i32, height: i32 },
    /// Right of the slingshot, up to a third of the frame width, above its centre.
    RightOfSling {
        cx: f64,
        cy: f64,
        sling_width: i32,
        frame_width: i32,
    },
}

impl TrainingWindow {
    pub fn for_frame(width: i32, height: i32, sling: Option<&Rect>) -> Self {
        match sling {
            Some(s) => {
                let (cx, cy) = s.center();
                TrainingWindow::RightOfSling {
                    cx,
                    cy,
                    sling_width: s.width,
                    frame_width: width,
                }
            }
            None => TrainingWindow::Centre { width, height },
        }
    }

    pub fn admits(&self, p: Point) -> bool {
        match *self {
            TrainingWindow::Centre { width, height } => {
                (p.x - width / 2).abs() <= width / 6 && p.y <= height / 5 * 3
            }
            TrainingWindow::RightOfSling {
                cx,
                cy,
                sling_width,
                frame_width,
            } => {
                let (x, y) = (p.x as f64, p.y as f64);
                x >= cx + 2.0 * sling_width as f64
                    && x <= cx + (frame_width / 3) as f64
                    && y <= cy
            }
        }
    }
}

/// Outcome of a parabola fit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParabolaFit {
    Fitted(Trajectory),
    /// Too few distinct x positions, or a singular system.
    Degenerate,
}

impl ParabolaFit {
    /// Fitted coefficients, all zero for a degenerate fit.
    pub fn coefficients(&self) -> Trajectory {
        match self {
            ParabolaFit::Fitted(t) => *t,
            ParabolaFit::Degenerate => Trajectory::default(),
        }
    }

    pub fn trajectory(&self) -> Option<Trajectory> {
        match self {
            ParabolaFit::Fitted(t) => Some(*t),
            ParabolaFit::Degenerate => None,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, ParabolaFit::Degenerate)
    }

    /// The curve, if it opens downward on screen (y grows downward, so `w0 > 0`).
    pub fn plausible_arc(&self) -> Option<Trajectory> {
        self.trajectory().filter(|t| t.w0 > 0.0)
    }
}

/// Fit a parabola to at most `training_size` points accepted by `window`.
pub fn fit_parabola(points: &[Point], window: &TrainingWindow, training_size: usize) -> ParabolaFit {
    let training: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| window.admits(*p))
        .take(training_size)
        .collect();

    let mut xs: Vec<i32> = training.iter().map(|p| p.x).collect();
    xs.sort_unstable();
    xs.dedup();
    if xs.len() < 3 {
        warn!(
            "Parabola fit is degenerate: {} training point(s) over {} distinct x",
            training.len(),
            xs.len()
        );
        return ParabolaFit::Degenerate;
    }

    // Centre and scale x so the normal equations stay well conditioned
    let n = training.len() as f64;
    let mean = training.iter().map(|p| p.x as f64).sum::<f64>() / n;
    let scale = (training
        .iter()
        .map(|p| (p.x as f64 - mean).powi(2))
        .sum::<f64>()
        / n)
        .sqrt();

    let mut xtx = Matrix3::<f64>::zeros();
    let mut xty = Vector3::<f64>::zeros();
    for p in &training {
        let t = (p.x as f64 - mean) / scale;
        let row = Vector3::new(t * t, t, 1.0);
        xtx += row * row.transpose();
        xty += row * p.y as f64;
    }

    let Some(inverse) = xtx.try_inverse() else {
        warn!("Parabola fit is degenerate: singular normal equations");
        return ParabolaFit::Degenerate;
    };
    let a = inverse * xty;

    let s2 = scale * scale;
    let fit = Trajectory {
        w0: a[0] / s2,
        w1: a[1] / scale - 2.0 * a[0] * mean / s2,
        w2: a[0] * mean * mean / s2 - a[1] * mean / scale + a[2],
    };
    debug!(
        "Parabola fitted to {} of {} point(s): {:?}",
        training.len(),
        points.len(),
        fit
    );
    ParabolaFit::Fitted(fit)
}

/// Points along the curve from `start_x`, `count` samples `step` pixels apart.
pub fn sample_arc(curve: &Trajectory, start_x: i32, step: i32, count: usize) -> Vec<Point> {
    (0..count as i32)
        .map(|i| {
            let x = start_x + i * step;
            Point::new(x, curve.y_at(x as f64).round() as i32)
        })
        .collect()
}
