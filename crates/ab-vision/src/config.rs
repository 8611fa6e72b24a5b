//! Calibration for the 840x480 game frame.
//!
//! Every palette and threshold here was fitted to one rendering of the game.
//! `VisionConfig::default()` carries the calibrated values; a JSON file can
//! override them without touching the algorithms.

use ab_capture::{regions, Rect};
use ab_state::ObjectKind;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::quantize::{Palette, QuantizedColor};

/// One side of a dilation margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extent {
    Fixed(i32),
    /// Half the box dimension plus one pixel.
    HalfPlusOne,
}

impl Extent {
    pub fn resolve(self, size: i32) -> i32 {
        match self {
            Extent::Fixed(n) => n,
            Extent::HalfPlusOne => size / 2 + 1,
        }
    }
}

/// How far to grow a box horizontally and vertically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub x: Extent,
    pub y: Extent,
}

impl Margin {
    pub const fn fixed(dx: i32, dy: i32) -> Self {
        Self {
            x: Extent::Fixed(dx),
            y: Extent::Fixed(dy),
        }
    }

    pub const fn new(x: Extent, y: Extent) -> Self {
        Self { x, y }
    }

    pub fn apply(&self, r: &Rect) -> Rect {
        r.dilate(self.x.resolve(r.width), self.y.resolve(r.height))
    }
}

/// A colour-count condition on a histogram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramRule {
    Present(QuantizedColor),
    Absent(QuantizedColor),
    /// Count must be strictly above `max(floor, area_fraction * area)`.
    Exceeds {
        colour: QuantizedColor,
        floor: u32,
        area_fraction: f64,
    },
}

/// Secondary evidence a candidate needs before it is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// The dilated candidate must overlap a segment of a confirming colour.
    /// With `absorb`, every overlapping confirming segment joins the object.
    Overlap { palette: Palette, absorb: bool },
    /// The finished box must satisfy every rule.
    Histogram { rules: Vec<HistogramRule> },
}

/// Shape filter on the dilated, uncropped box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Geometry {
    WiderThan(i32),
    /// Top edge within `min..=max`.
    TopWithin { min: i32, max: i32 },
}

impl Geometry {
    pub fn admits(&self, r: &Rect) -> bool {
        match *self {
            Geometry::WiderThan(w) => r.width > w,
            Geometry::TopWithin { min, max } => r.y >= min && r.y <= max,
        }
    }
}

/// Segment-merging classifier settings for one object kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectProfile {
    pub kind: ObjectKind,
    pub primary: QuantizedColor,
    pub seed_margin: Margin,
    pub merge_palette: Palette,
    pub merge_margin: Margin,
    /// Further primary segments touching the grown bounds are skipped, not merged.
    #[serde(default)]
    pub suppress_margin: Option<Margin>,
    pub evidence: Evidence,
    #[serde(default)]
    pub final_margin: Option<Margin>,
    #[serde(default)]
    pub geometry: Vec<Geometry>,
}

/// Plain colour-region search, used for the building blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockProfile {
    pub kind: ObjectKind,
    pub palette: Palette,
}

/// Admission rule for colour-region search results
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionRules {
    /// Regions must have strictly more than this area.
    pub min_area: i64,
    /// Regions entirely inside this rectangle are HUD.
    pub exclusion: Rect,
}

impl RegionRules {
    pub fn admits(&self, r: &Rect) -> bool {
        r.area() > self.min_area && !self.exclusion.contains_rect(r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlingshotProfile {
    pub palette: Palette,
    /// Top-left colours that indicate a shelf fused under the sling.
    pub shelf_markers: Palette,
    /// Background colour trimmed off the sides.
    pub backdrop: QuantizedColor,
    pub backdrop_fraction: f64,
    /// Candidates at most this tall are not trimmed.
    pub trim_min_height: i32,
    pub evidence: Vec<HistogramRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryProfile {
    pub palette: Palette,
    pub max_marker_area: i64,
    pub training_size: usize,
    pub max_residual: f64,
    pub menu: Rect,
}

/// All calibration used by one vision run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisionConfig {
    pub regions: RegionRules,
    pub objects: Vec<ObjectProfile>,
    pub blocks: Vec<BlockProfile>,
    pub slingshot: SlingshotProfile,
    pub trajectory: TrajectoryProfile,
}

impl VisionConfig {
    /// Load calibration overrides from a JSON file.
    /// A missing file falls back to the built-in calibration.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "No vision config at {}, using built-in calibration",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        info!(
            "Loaded vision config from {}: {} object profile(s), {} block profile(s)",
            path.display(),
            config.objects.len(),
            config.blocks.len()
        );
        Ok(config)
    }

    pub fn object(&self, kind: ObjectKind) -> Option<&ObjectProfile> {
        self.objects.iter().find(|p| p.kind == kind)
    }

    pub fn block(&self, kind: ObjectKind) -> Option<&BlockProfile> {
        self.blocks.iter().find(|p| p.kind == kind)
    }

    /// Every kind this config can detect, slingshot excluded.
    pub fn kinds(&self) -> Vec<ObjectKind> {
        self.objects
            .iter()
            .map(|p| p.kind)
            .chain(self.blocks.iter().map(|p| p.kind))
            .collect()
    }
}

fn colour(code: u16) -> QuantizedColor {
    QuantizedColor::new(code)
}

fn present(code: u16) -> HistogramRule {
    HistogramRule::Present(colour(code))
}

const TALL: Margin = Margin::new(Extent::Fixed(1), Extent::HalfPlusOne);
const PROPORTIONAL: Margin = Margin::new(Extent::HalfPlusOne, Extent::HalfPlusOne);
const TIGHT: Margin = Margin::fixed(2, 2);

impl Default for VisionConfig {
    fn default() -> Self {
        let objects = vec![
            ObjectProfile {
                kind: ObjectKind::Pig,
                primary: colour(376),
                seed_margin: PROPORTIONAL,
                merge_palette: Palette::new(&[376]),
                merge_margin: PROPORTIONAL,
                suppress_margin: None,
                evidence: Evidence::Overlap {
                    palette: Palette::new(&[250]),
                    absorb: false,
                },
                final_margin: Some(PROPORTIONAL),
                geometry: Vec::new(),
            },
            ObjectProfile {
                kind: ObjectKind::RedBird,
                primary: colour(385),
                seed_margin: TALL,
                merge_palette: Palette::new(&[385]),
                merge_margin: TALL,
                suppress_margin: None,
                evidence: Evidence::Overlap {
                    palette: Palette::new(&[488, 501]),
                    absorb: true,
                },
                final_margin: None,
                geometry: Vec::new(),
            },
            ObjectProfile {
                kind: ObjectKind::BlueBird,
                primary: colour(238),
                seed_margin: TALL,
                merge_palette: Palette::new(&[238, 165, 280, 344, 488, 416]),
                merge_margin: Margin::new(Extent::Fixed(2), Extent::HalfPlusOne),
                suppress_margin: Some(Margin::new(Extent::Fixed(2), Extent::HalfPlusOne)),
                evidence: Evidence::Overlap {
                    palette: Palette::new(&[488]),
                    absorb: true,
                },
                final_margin: None,
                geometry: vec![Geometry::WiderThan(3)],
            },
            ObjectProfile {
                kind: ObjectKind::YellowBird,
                primary: colour(497),
                seed_margin: TIGHT,
                merge_palette: Palette::new(&[497]),
                merge_margin: TIGHT,
                suppress_margin: None,
                evidence: Evidence::Histogram {
                    rules: vec![present(288)],
                },
                final_margin: Some(TIGHT),
                geometry: Vec::new(),
            },
            ObjectProfile {
                kind: ObjectKind::WhiteBird,
                primary: colour(490),
                seed_margin: TIGHT,
                merge_palette: Palette::new(&[490, 508, 510]),
                merge_margin: TIGHT,
                suppress_margin: None,
                evidence: Evidence::Histogram {
                    rules: vec![present(510), present(508)],
                },
                final_margin: Some(TIGHT),
                // Higher or lower candidates are clouds and ground decoration
                geometry: vec![Geometry::TopWithin { min: 60, max: 385 }],
            },
            ObjectProfile {
                kind: ObjectKind::BlackBird,
                primary: colour(488),
                seed_margin: TIGHT,
                merge_palette: Palette::new(&[488, 146, 64, 0]),
                merge_margin: TIGHT,
                suppress_margin: None,
                evidence: Evidence::Histogram {
                    rules: vec![
                        HistogramRule::Exceeds {
                            colour: colour(0),
                            floor: 32,
                            area_fraction: 0.1,
                        },
                        present(64),
                        HistogramRule::Absent(colour(385)),
                    ],
                },
                final_margin: Some(TIGHT),
                geometry: Vec::new(),
            },
            ObjectProfile {
                kind: ObjectKind::Tnt,
                primary: colour(410),
                seed_margin: TIGHT,
                merge_palette: Palette::new(&[410, 418]),
                merge_margin: TIGHT,
                suppress_margin: None,
                evidence: Evidence::Histogram {
                    rules: vec![present(457), present(511)],
                },
                final_margin: Some(TIGHT),
                geometry: Vec::new(),
            },
        ];

        let blocks = vec![
            BlockProfile {
                kind: ObjectKind::Wood,
                palette: Palette::new(&[408, 417, 481]),
            },
            BlockProfile {
                kind: ObjectKind::Stone,
                palette: Palette::new(&[365]),
            },
            BlockProfile {
                kind: ObjectKind::Ice,
                palette: Palette::new(&[183, 247, 311]),
            },
        ];

        Self {
            regions: RegionRules {
                min_area: 10,
                exclusion: regions::hud(),
            },
            objects,
            blocks,
            slingshot: SlingshotProfile {
                palette: Palette::new(&[209, 273, 281, 282, 345, 346, 351, 354, 418]),
                shelf_markers: Palette::new(&[511, 447]),
                backdrop: colour(511),
                backdrop_fraction: 0.8,
                trim_min_height: 10,
                evidence: vec![
                    HistogramRule::Exceeds {
                        colour: colour(345),
                        floor: 32,
                        area_fraction: 0.1,
                    },
                    present(64),
                ],
            },
            trajectory: TrajectoryProfile {
                palette: Palette::new(&[365, 366, 438]),
                max_marker_area: 25,
                training_size: 60,
                max_residual: 10.0,
                menu: regions::menu(),
            },
        }
    }
}
