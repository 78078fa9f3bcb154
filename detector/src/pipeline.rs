//! Sampling, per-frame inference and aggregation wired together.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

use crate::aggregate::{aggregate, classify};
use crate::classifier::Classifier;
use crate::error::{DetectError, Result};
use crate::frame::{Frame, PredictionVector, Verdict};
use crate::preprocess::{InputFormat, preprocess};
use crate::sampler::{FrameSampler, SamplingPlan};

/// Outcome of analysing one video
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub verdict: Verdict,
    pub fake_score: f32,
    /// One `[real, fake]` distribution per sampled frame, in temporal order
    pub per_frame: Vec<PredictionVector>,
    /// Source position of each sampled frame
    pub frame_indices: Vec<usize>,
}

/// Shared, read-only detection pipeline.
///
/// Built once at startup and handed to request handlers behind an `Arc`.
pub struct Detector {
    sampler: Arc<dyn FrameSampler>,
    classifier: Arc<dyn Classifier>,
    plan: SamplingPlan,
}

impl Detector {
    pub fn new(
        sampler: Arc<dyn FrameSampler>,
        classifier: Arc<dyn Classifier>,
        plan: SamplingPlan,
    ) -> Self {
        Self {
            sampler,
            classifier,
            plan,
        }
    }

    /// Run the full pipeline over a video file. Blocking.
    pub fn analyze(&self, path: &Path) -> Result<Analysis> {
        let frames = self.sampler.sample(path, &self.plan);
        if frames.is_empty() {
            return Err(DetectError::UnreadableVideo);
        }

        let format = self.classifier.input_format();
        let per_frame = frames
            .iter()
            .map(|frame| self.predict_frame(frame, &format))
            .collect::<Result<Vec<_>>>()?;

        let fake_score = aggregate(&per_frame)?;
        let verdict = classify(fake_score);

        log::info!(
            "Analysed {} frames from {:?}: fake_score={:.4} verdict={}",
            per_frame.len(),
            path,
            fake_score,
            verdict
        );

        Ok(Analysis {
            verdict,
            fake_score,
            per_frame,
            frame_indices: frames.iter().map(|f| f.index).collect(),
        })
    }

    fn predict_frame(&self, frame: &Frame, format: &InputFormat) -> Result<PredictionVector> {
        let input = preprocess(frame, format)?;

        let logits = self
            .classifier
            .logits(&input)
            .map_err(|e| DetectError::Inference {
                index: frame.index,
                message: format!("{:#}", e),
            })?;

        PredictionVector::from_logits(logits).ok_or_else(|| DetectError::Inference {
            index: frame.index,
            message: format!("non-finite class scores {:?}", logits),
        })
    }
}
