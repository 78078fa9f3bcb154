//! Deepfake detection over sampled video frames.
//!
//! A [`Detector`] samples frames from a video file, classifies each one as
//! real or fake, and folds the per-frame probabilities into a single score
//! and [`Verdict`].

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod preprocess;
pub mod sampler;

pub use aggregate::{FAKE_THRESHOLD, aggregate, classify};
pub use classifier::{Classifier, FixedClassifier, VitClassifier};
pub use config::{DetectorConfig, ModelSource};
pub use error::DetectError;
pub use frame::{Frame, PredictionVector, Verdict};
pub use pipeline::{Analysis, Detector};
pub use preprocess::{FrameTensor, InputFormat};
pub use sampler::{FfmpegSampler, FrameSampler, SamplingPlan};
