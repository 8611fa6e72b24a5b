use ab_capture::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Every kind of scene object the vision layer can label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Pig,
    RedBird,
    BlueBird,
    YellowBird,
    WhiteBird,
    BlackBird,
    Wood,
    Stone,
    Ice,
    Tnt,
    Slingshot,
}

impl ObjectKind {
    pub const BIRDS: [ObjectKind; 5] = [
        ObjectKind::RedBird,
        ObjectKind::BlueBird,
        ObjectKind::YellowBird,
        ObjectKind::WhiteBird,
        ObjectKind::BlackBird,
    ];

    pub const BLOCKS: [ObjectKind; 3] = [ObjectKind::Wood, ObjectKind::Stone, ObjectKind::Ice];

    pub fn is_bird(self) -> bool {
        Self::BIRDS.contains(&self)
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Pig => "pig",
            ObjectKind::RedBird => "red_bird",
            ObjectKind::BlueBird => "blue_bird",
            ObjectKind::YellowBird => "yellow_bird",
            ObjectKind::WhiteBird => "white_bird",
            ObjectKind::BlackBird => "black_bird",
            ObjectKind::Wood => "wood",
            ObjectKind::Stone => "stone",
            ObjectKind::Ice => "ice",
            ObjectKind::Tnt => "tnt",
            ObjectKind::Slingshot => "slingshot",
        }
    }
}

/// A labelled bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: ObjectKind,
    pub bounds: Rect,
}

impl Detection {
    pub fn new(kind: ObjectKind, bounds: Rect) -> Self {
        Self { kind, bounds }
    }
}

/// Coefficients of `y = w0*x^2 + w1*x + w2`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trajectory {
    pub w0: f64,
    pub w1: f64,
    pub w2: f64,
}

impl Trajectory {
    pub fn y_at(&self, x: f64) -> f64 {
        self.w0 * x * x + self.w1 * x + self.w2
    }
}

/// Everything extracted from a single screenshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneState {
    pub detections: Vec<Detection>,
    pub slingshot: Option<Rect>,
    pub trajectory_points: Vec<Point>,
    /// `None` when the marker points could not determine a curve.
    pub trajectory: Option<Trajectory>,
    /// Samples of a plausible arc, starting at the slingshot centre.
    #[serde(default)]
    pub arc: Vec<Point>,
}

impl SceneState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounding boxes of one kind, in detection order
    pub fn of_kind(&self, kind: ObjectKind) -> Vec<Rect> {
        self.detections
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| d.bounds)
            .collect()
    }

    pub fn pigs(&self) -> Vec<Rect> {
        self.of_kind(ObjectKind::Pig)
    }

    pub fn birds(&self) -> Vec<Detection> {
        self.detections
            .iter()
            .filter(|d| d.kind.is_bird())
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty() && self.slingshot.is_none() && self.trajectory_points.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
