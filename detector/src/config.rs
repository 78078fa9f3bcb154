//! Detector settings read from the environment.
//!
//! | Env Var                   | Default                                      |
//! |---------------------------|----------------------------------------------|
//! | `DETECTOR_MAX_FRAMES`     | `16`                                         |
//! | `DETECTOR_FRAME_STRIDE`   | `10`                                         |
//! | `FFMPEG_THREADS`          | `1`                                          |
//! | `DETECTOR_MODEL_DIR`      | unset (local checkpoint, wins over the hub)  |
//! | `DETECTOR_MODEL_REPO`     | `prithivMLmods/Deep-Fake-Detector-v2-Model`  |
//! | `DETECTOR_MODEL_REVISION` | unset                                        |

use std::fmt;
use std::path::PathBuf;

use crate::sampler::SamplingPlan;

const DEFAULT_MAX_FRAMES: usize = 16;
const DEFAULT_FRAME_STRIDE: usize = 10;
const DEFAULT_FFMPEG_THREADS: usize = 1;
const DEFAULT_MODEL_REPO: &str = "prithivMLmods/Deep-Fake-Detector-v2-Model";

/// Where the classifier checkpoint comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Local(PathBuf),
    Hub {
        repo: String,
        revision: Option<String>,
    },
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Local(dir) => write!(f, "{}", dir.display()),
            ModelSource::Hub {
                repo,
                revision: Some(rev),
            } => write!(f, "hf://{}@{}", repo, rev),
            ModelSource::Hub {
                repo,
                revision: None,
            } => write!(f, "hf://{}", repo),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub max_frames: usize,
    pub frame_stride: usize,
    pub ffmpeg_threads: usize,
    pub model: ModelSource,
}

impl DetectorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Missing, unparsable or zero
    /// numbers fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model = match non_empty("DETECTOR_MODEL_DIR") {
            Some(dir) => ModelSource::Local(PathBuf::from(dir)),
            None => ModelSource::Hub {
                repo: non_empty("DETECTOR_MODEL_REPO")
                    .unwrap_or_else(|| DEFAULT_MODEL_REPO.to_string()),
                revision: non_empty("DETECTOR_MODEL_REVISION"),
            },
        };

        Self {
            max_frames: positive(&lookup, "DETECTOR_MAX_FRAMES", DEFAULT_MAX_FRAMES),
            frame_stride: positive(&lookup, "DETECTOR_FRAME_STRIDE", DEFAULT_FRAME_STRIDE),
            ffmpeg_threads: positive(&lookup, "FFMPEG_THREADS", DEFAULT_FFMPEG_THREADS),
            model,
        }
    }

    pub fn sampling_plan(&self) -> SamplingPlan {
        SamplingPlan::new(self.max_frames, self.frame_stride)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn positive<F>(lookup: &F, key: &str, default: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> DetectorConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        DetectorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = DetectorConfig::default();
        assert_eq!(cfg.max_frames, 16);
        assert_eq!(cfg.frame_stride, 10);
        assert_eq!(cfg.ffmpeg_threads, 1);
        assert_eq!(
            cfg.model,
            ModelSource::Hub {
                repo: DEFAULT_MODEL_REPO.to_string(),
                revision: None
            }
        );
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("DETECTOR_MAX_FRAMES", "8"),
            ("DETECTOR_FRAME_STRIDE", " 5 "),
            ("FFMPEG_THREADS", "4"),
            ("DETECTOR_MODEL_REPO", "acme/fake-vit"),
            ("DETECTOR_MODEL_REVISION", "v2"),
        ]);
        assert_eq!(cfg.sampling_plan(), SamplingPlan::new(8, 5));
        assert_eq!(cfg.ffmpeg_threads, 4);
        assert_eq!(cfg.model.to_string(), "hf://acme/fake-vit@v2");
    }

    #[test]
    fn test_huge_frame_counts_keep_a_bounded_decode() {
        let cfg = config(&[
            ("DETECTOR_MAX_FRAMES", usize::MAX.to_string().as_str()),
            ("DETECTOR_FRAME_STRIDE", "10"),
        ]);
        assert_eq!(cfg.sampling_plan().decode_limit(), crate::sampler::MAX_DECODE_LIMIT);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let cfg = config(&[("DETECTOR_MAX_FRAMES", "0"), ("DETECTOR_FRAME_STRIDE", "ten")]);
        assert_eq!(cfg.max_frames, 16);
        assert_eq!(cfg.frame_stride, 10);
    }

    #[test]
    fn test_local_dir_wins_over_hub() {
        let cfg = config(&[
            ("DETECTOR_MODEL_DIR", "/models/vit"),
            ("DETECTOR_MODEL_REPO", "acme/fake-vit"),
        ]);
        assert_eq!(cfg.model, ModelSource::Local(PathBuf::from("/models/vit")));
    }
}
