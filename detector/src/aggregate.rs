//! Folding per-frame predictions into one score and verdict.

use crate::error::{DetectError, Result};
use crate::frame::{PredictionVector, Verdict};

/// Scores strictly above this are FAKE.
pub const FAKE_THRESHOLD: f32 = 0.4;

/// Unweighted mean of the fake component across all frames.
///
/// Every frame counts equally; no smoothing or confidence weighting.
pub fn aggregate(predictions: &[PredictionVector]) -> Result<f32> {
    if predictions.is_empty() {
        return Err(DetectError::EmptyPredictions);
    }

    let total: f64 = predictions.iter().map(|p| p.fake() as f64).sum();
    let mean = total / predictions.len() as f64;

    Ok(mean.clamp(0.0, 1.0) as f32)
}

pub fn classify(score: f32) -> Verdict {
    if score > FAKE_THRESHOLD {
        Verdict::Fake
    } else {
        Verdict::Real
    }
}
