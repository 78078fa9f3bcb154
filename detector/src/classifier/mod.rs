use anyhow::Result;

use crate::preprocess::{FrameTensor, InputFormat};

/// Pluggable two-class frame classifier.
///
/// Implementations are loaded once and shared read-only across requests.
pub trait Classifier: Send + Sync {
    /// Input size and normalisation the model was trained with
    fn input_format(&self) -> InputFormat;

    /// Unnormalised `[real, fake]` scores for one preprocessed frame
    fn logits(&self, input: &FrameTensor) -> Result<[f32; 2]>;
}

mod fixed;
mod vit;

pub use fixed::FixedClassifier;
pub use vit::VitClassifier;
