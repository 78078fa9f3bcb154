use image::{ImageBuffer, Rgb};

use crate::error::{DetectError, Result};
use crate::frame::Frame;

/// Mean/std used by ViT image processors that ship without a preprocessor config
pub const DEFAULT_MEAN: [f32; 3] = [0.5, 0.5, 0.5];
pub const DEFAULT_STD: [f32; 3] = [0.5, 0.5, 0.5];

/// Input contract of a classifier: square side length and per-channel normalisation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFormat {
    pub size: u32,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Default for InputFormat {
    fn default() -> Self {
        Self {
            size: 224,
            mean: DEFAULT_MEAN,
            std: DEFAULT_STD,
        }
    }
}

/// Normalised CHW tensor data for a single frame
#[derive(Debug, Clone)]
pub struct FrameTensor {
    pub size: usize,
    pub data: Vec<f32>,
}

impl FrameTensor {
    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (1, 3, self.size, self.size)
    }
}

/// Scale a frame to the classifier's input size and normalise it.
pub fn preprocess(frame: &Frame, format: &InputFormat) -> Result<FrameTensor> {
    if frame.rgb.len() != frame.expected_len() {
        return Err(DetectError::Preprocess(format!(
            "frame {} expected {}x{}x3 RGB, got {} bytes",
            frame.index,
            frame.width,
            frame.height,
            frame.rgb.len()
        )));
    }

    let img: ImageBuffer<Rgb<u8>, &[u8]> =
        ImageBuffer::from_raw(frame.width, frame.height, frame.rgb.as_slice())
            .ok_or_else(|| DetectError::Preprocess("Invalid image dimensions".to_string()))?;

    let resized = image::imageops::resize(
        &img,
        format.size,
        format.size,
        image::imageops::FilterType::Triangle,
    );

    let size = format.size as usize;
    let plane = size * size;
    let mut data = vec![0f32; 3 * plane];

    for (i, pixel) in resized.pixels().enumerate() {
        for c in 0..3 {
            let x = pixel[c] as f32 / 255.0;
            data[c * plane + i] = (x - format.mean[c]) / format.std[c];
        }
    }

    Ok(FrameTensor { size, data })
}
