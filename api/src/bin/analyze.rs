//! Run the detection pipeline on a local video file.
//!
//! Prints the analysis (verdict, score, per-frame distributions and the
//! sampled frame positions) as JSON on stdout.
//!
//! ## Usage
//! `analyze <video>`
//!
//! Reads the same `DETECTOR_*` and `FFMPEG_THREADS` variables as the server.

use anyhow::{Context, Result, anyhow};
use deepfake_api::logging;
use deepfake_detector::{Detector, DetectorConfig, FfmpegSampler, VitClassifier};
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Usage: analyze <video>"))?;

    let config = DetectorConfig::from_env();
    let classifier = VitClassifier::load(&config.model)?;
    let detector = Detector::new(
        Arc::new(FfmpegSampler::new(config.ffmpeg_threads)),
        Arc::new(classifier),
        config.sampling_plan(),
    );

    let analysis = detector
        .analyze(&path)
        .with_context(|| format!("Failed to analyze {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}
