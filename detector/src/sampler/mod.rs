use std::path::Path;

use crate::frame::Frame;

mod ffmpeg;

pub use ffmpeg::{FfmpegSampler, RawFrameReader};

/// Upper bound handed to the decoder as a frame count
pub const MAX_DECODE_LIMIT: usize = i32::MAX as usize;

/// How many frames to take from a video and how far apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPlan {
    max_frames: usize,
    stride: usize,
}

impl SamplingPlan {
    /// Both values are clamped to at least 1.
    pub fn new(max_frames: usize, stride: usize) -> Self {
        Self {
            max_frames: max_frames.max(1),
            stride: stride.max(1),
        }
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of source frames that must be decoded to satisfy the plan,
    /// capped at [`MAX_DECODE_LIMIT`]
    pub fn decode_limit(&self) -> usize {
        (self.max_frames - 1)
            .saturating_mul(self.stride)
            .saturating_add(1)
            .min(MAX_DECODE_LIMIT)
    }
}

/// Pulls a bounded, evenly spaced set of RGB frames out of a video file
pub trait FrameSampler: Send + Sync {
    /// An empty result means the video could not be opened or decoded.
    fn sample(&self, path: &Path, plan: &SamplingPlan) -> Vec<Frame>;
}

/// Keep every `stride`-th frame from a sequentially decoded source, starting
/// with the first, until the source ends or `max_frames` have been kept.
/// Each kept frame is stamped with its source position.
pub fn select_frames<I>(decoded: I, plan: &SamplingPlan) -> Vec<Frame>
where
    I: IntoIterator<Item = Frame>,
{
    decoded
        .into_iter()
        .enumerate()
        .step_by(plan.stride)
        .take(plan.max_frames)
        .map(|(index, frame)| Frame { index, ..frame })
        .collect()
}
