use serde::{Deserialize, Serialize};

/// Decoded video frame in packed RGB order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position of this frame in the source video (0-based)
    pub index: usize,
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl Frame {
    /// Expected buffer length for the frame's dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Probability distribution over `[real, fake]` for one frame.
///
/// Serializes as a plain two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionVector(pub [f32; 2]);

impl PredictionVector {
    /// Normalise raw `[real, fake]` classifier scores with a two-way softmax.
    ///
    /// Returns `None` if either score is not finite.
    pub fn from_logits(logits: [f32; 2]) -> Option<Self> {
        let [real, fake] = logits;
        if !real.is_finite() || !fake.is_finite() {
            return None;
        }

        // Shift by the max so exp() cannot overflow
        let max = real.max(fake);
        let real = (real - max).exp();
        let fake = (fake - max).exp();
        let total = real + fake;

        Some(Self([real / total, fake / total]))
    }

    pub fn real(&self) -> f32 {
        self.0[0]
    }

    pub fn fake(&self) -> f32 {
        self.0[1]
    }
}

/// Final classification for a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Real,
    Fake,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Real => "REAL",
            Verdict::Fake => "FAKE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
