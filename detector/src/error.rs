use thiserror::Error;

/// Failures raised by the detection pipeline.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The sampler produced no frames: the file could not be opened or decoded.
    #[error("Could not extract frames from video")]
    UnreadableVideo,

    /// Aggregation was asked to score an empty prediction sequence.
    #[error("Cannot aggregate an empty prediction sequence")]
    EmptyPredictions,

    #[error("Failed to preprocess frame: {0}")]
    Preprocess(String),

    #[error("Inference failed on frame {index}: {message}")]
    Inference { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, DetectError>;
