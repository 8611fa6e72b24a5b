//! Analyze a saved Angry Birds screenshot and print the scene as JSON.
//! Usage: ab-scout <screenshot.png> [output_dir] [vision_config.json]

use std::path::{Path, PathBuf};

use ab_capture::Screenshot;
use ab_scout::ScenePipeline;
use ab_state::SceneState;
use ab_vision::VisionConfig;
use anyhow::{Context, Result};

fn main() {
    ab_scout::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!(
            "Usage: {} <screenshot.png> [output_dir] [vision_config.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let input_path = PathBuf::from(&args[1]);
    let output_dir = args.get(2).map(PathBuf::from);
    let config_path = args.get(3).map(PathBuf::from);

    if let Err(e) = run(&input_path, output_dir.as_deref(), config_path.as_deref()) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(input_path: &Path, output_dir: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => VisionConfig::load(path)?,
        None => VisionConfig::default(),
    };

    eprintln!("Loading image: {}", input_path.display());
    let shot = Screenshot::load(input_path)?;

    let state = ScenePipeline::new(config).analyze(&shot);
    println!("{}", state.to_json().context("Failed to serialize scene")?);

    if let Some(dir) = output_dir {
        save_crops(&shot, &state, dir)?;
        eprintln!("Debug crops saved to: {}", dir.display());
    }
    Ok(())
}

/// Write one PNG per detection, named `<kind>_<n>.png`.
fn save_crops(shot: &Screenshot, state: &SceneState, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut counts = std::collections::HashMap::new();
    for detection in &state.detections {
        let n = counts.entry(detection.kind).or_insert(0usize);
        let path = dir.join(format!("{}_{}.png", detection.kind.name(), n));
        *n += 1;
        ab_capture::crop_region(shot.image(), &detection.bounds)
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }

    if let Some(sling) = &state.slingshot {
        let path = dir.join("slingshot.png");
        ab_capture::crop_region(shot.image(), sling)
            .save(&path)
            .with_context(|| format!("Failed to save {}", path.display()))?;
    }
    Ok(())
}
