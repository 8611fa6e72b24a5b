//! Scene understanding for 840x480 Angry Birds screenshots.
//!
//! Pixels are quantized to 9-bit colour codes, labelled into same-colour
//! segments, and the per-kind classifiers combine segment boxes, colour-region
//! searches and histograms into detections. Trajectory markers are fitted with
//! a least-squares parabola.

mod catalog;
mod classify;
mod config;
mod grid;
mod histogram;
mod parabola;
mod quantize;
mod region_finder;
mod scene;
mod segments;
mod slingshot;
mod trajectory;

pub use catalog::{RegionCatalog, SegmentMask};
pub use classify::classify;
pub use config::{
    BlockProfile, Evidence, Extent, Geometry, HistogramRule, Margin, ObjectProfile, RegionRules,
    SlingshotProfile, TrajectoryProfile, VisionConfig,
};
pub use grid::SceneGrid;
pub use histogram::Histogram;
pub use parabola::{fit_parabola, sample_arc, ParabolaFit, TrainingWindow};
pub use quantize::{Palette, QuantizedColor};
pub use region_finder::{find_regions, find_regions_default};
pub use scene::Vision;
pub use segments::{label_components, Segmentation};
pub use slingshot::find_slingshot;
pub use trajectory::{filter_markers, find_trajectory, marker_centroids};
