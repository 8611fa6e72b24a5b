use ab_capture::Screenshot;
use ab_state::{Detection, ObjectKind, SceneState};
use ab_vision::{sample_arc, Vision, VisionConfig};
use rayon::prelude::*;
use tracing::{debug, info};

/// Horizontal distance between arc samples, in pixels.
const ARC_STEP: i32 = 10;
const ARC_SAMPLES: usize = 100;

/// Runs every detector over a screenshot and collects a `SceneState`
#[derive(Debug, Clone)]
pub struct ScenePipeline {
    config: VisionConfig,
    parallel: bool,
}

impl Default for ScenePipeline {
    fn default() -> Self {
        Self::new(VisionConfig::default())
    }
}

impl ScenePipeline {
    pub fn new(config: VisionConfig) -> Self {
        Self {
            config,
            parallel: true,
        }
    }

    /// Run the detectors one after another instead of on the rayon pool.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    pub fn analyze(&self, shot: &Screenshot) -> SceneState {
        let vision = Vision::with_config(shot, self.config.clone());
        let kinds = vision.config().kinds();

        let (slingshot, detections) = if self.parallel {
            rayon::join(
                || vision.find_slingshot(),
                || {
                    kinds
                        .par_iter()
                        .flat_map_iter(|&kind| detect(&vision, kind))
                        .collect::<Vec<_>>()
                },
            )
        } else {
            let detections: Vec<Detection> = kinds
                .iter()
                .flat_map(|&kind| detect(&vision, kind))
                .collect();
            (vision.find_slingshot(), detections)
        };

        let trajectory_points = vision.find_trajectory_points_near(slingshot.as_ref());
        let fit = vision.fit_parabola_near(&trajectory_points, slingshot.as_ref());

        let arc = match (slingshot, fit.plausible_arc()) {
            (Some(sling), Some(curve)) => {
                sample_arc(&curve, sling.center_point().x, ARC_STEP, ARC_SAMPLES)
            }
            _ => Vec::new(),
        };

        let state = SceneState {
            detections,
            slingshot,
            trajectory_points,
            trajectory: fit.trajectory(),
            arc,
        };
        info!(
            "Scene: {} detection(s), {} pig(s), {} bird(s), slingshot {}, {} trajectory point(s)",
            state.detections.len(),
            state.pigs().len(),
            state.birds().len(),
            if state.slingshot.is_some() {
                "found"
            } else {
                "missing"
            },
            state.trajectory_points.len()
        );
        state
    }
}

fn detect(vision: &Vision, kind: ObjectKind) -> Vec<Detection> {
    let found = vision.find_objects(kind);
    debug!("{}: {} detection(s)", kind.name(), found.len());
    found
        .into_iter()
        .map(|bounds| Detection::new(kind, bounds))
        .collect()
}
