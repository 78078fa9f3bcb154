use anyhow::{Context, Result, anyhow};
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::vit;
use hf_hub::{Repo, RepoType, api::sync::Api};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::Classifier;
use crate::config::ModelSource;
use crate::preprocess::{DEFAULT_MEAN, DEFAULT_STD, FrameTensor, InputFormat};

const NUM_CLASSES: usize = 2;
const WEIGHTS_FILE: &str = "model.safetensors";
const CONFIG_FILE: &str = "config.json";
const PREPROCESSOR_FILE: &str = "preprocessor_config.json";

// Used when config.json carries no label containing "fake"
const DEFAULT_FAKE_INDEX: usize = 1;

struct ModelFiles {
    weights: PathBuf,
    config: PathBuf,
    preprocessor: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LabelConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PreprocessorConfig {
    image_mean: Option<Vec<f32>>,
    image_std: Option<Vec<f32>>,
}

/// Real/fake frame classifier backed by a fine-tuned ViT checkpoint.
///
/// The model is immutable after loading, so one instance serves every
/// request concurrently.
pub struct VitClassifier {
    model: vit::Model,
    device: Device,
    format: InputFormat,
    fake_index: usize,
}

impl VitClassifier {
    pub fn load(source: &ModelSource) -> Result<Self> {
        let device = select_device();

        log::info!("Loading deepfake classifier from {} on {:?}", source, device);

        let files = fetch_model_files(source)?;

        let config_json = std::fs::read_to_string(&files.config)
            .with_context(|| format!("Failed to read {:?}", files.config))?;
        let config: vit::Config =
            serde_json::from_str(&config_json).context("Invalid ViT config.json")?;
        let labels: LabelConfig = serde_json::from_str(&config_json).unwrap_or_default();
        let fake_index = fake_label_index(&labels.id2label);

        let (mean, std) = match &files.preprocessor {
            Some(path) => read_normalization(path)?,
            None => (DEFAULT_MEAN, DEFAULT_STD),
        };
        let format = InputFormat {
            size: config.image_size as u32,
            mean,
            std,
        };

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[files.weights], DType::F32, &device)?
        };
        let model = vit::Model::new(&config, NUM_CLASSES, vb)?;

        log::info!(
            "Deepfake classifier loaded ({}px input, fake class at index {})",
            format.size,
            fake_index
        );

        Ok(Self {
            model,
            device,
            format,
            fake_index,
        })
    }
}

impl Classifier for VitClassifier {
    fn input_format(&self) -> InputFormat {
        self.format
    }

    fn logits(&self, input: &FrameTensor) -> Result<[f32; 2]> {
        if input.size != self.format.size as usize {
            return Err(anyhow!(
                "Expected {}px input, got {}px",
                self.format.size,
                input.size
            ));
        }

        let tensor = Tensor::from_slice(&input.data, input.shape(), &self.device)?;
        let logits = self.model.forward(&tensor)?;
        let values: Vec<f32> = logits.flatten_all()?.to_vec1()?;

        if values.len() != NUM_CLASSES {
            return Err(anyhow!(
                "Expected {} class scores, got {}",
                NUM_CLASSES,
                values.len()
            ));
        }

        Ok([values[1 - self.fake_index], values[self.fake_index]])
    }
}

fn select_device() -> Device {
    #[cfg(feature = "cuda")]
    if let Ok(device) = Device::new_cuda(0) {
        return device;
    }
    #[cfg(feature = "metal")]
    if let Ok(device) = Device::new_metal(0) {
        return device;
    }
    Device::Cpu
}

fn fetch_model_files(source: &ModelSource) -> Result<ModelFiles> {
    match source {
        ModelSource::Local(dir) => {
            let weights = dir.join(WEIGHTS_FILE);
            let config = dir.join(CONFIG_FILE);
            for required in [&weights, &config] {
                if !required.is_file() {
                    return Err(anyhow!("Model file not found: {:?}", required));
                }
            }
            let preprocessor = Some(dir.join(PREPROCESSOR_FILE)).filter(|p| p.is_file());

            Ok(ModelFiles {
                weights,
                config,
                preprocessor,
            })
        }
        ModelSource::Hub { repo, revision } => {
            let api = Api::new()?;
            let repo = match revision {
                Some(rev) => Repo::with_revision(repo.clone(), RepoType::Model, rev.clone()),
                None => Repo::new(repo.clone(), RepoType::Model),
            };
            let repo = api.repo(repo);

            let weights = repo.get(WEIGHTS_FILE)?;
            let config = repo.get(CONFIG_FILE)?;
            let preprocessor = match repo.get(PREPROCESSOR_FILE) {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("No {} in model repo, using defaults: {}", PREPROCESSOR_FILE, e);
                    None
                }
            };

            Ok(ModelFiles {
                weights,
                config,
                preprocessor,
            })
        }
    }
}

/// Index of the label whose name mentions "fake", e.g. `{"0": "Realism", "1": "Deepfake"}`.
/// The lowest such index wins when several labels match.
fn fake_label_index(id2label: &HashMap<String, String>) -> usize {
    id2label
        .iter()
        .filter(|(_, label)| label.to_lowercase().contains("fake"))
        .filter_map(|(id, _)| id.parse::<usize>().ok())
        .filter(|id| *id < NUM_CLASSES)
        .min()
        .unwrap_or(DEFAULT_FAKE_INDEX)
}

fn read_normalization(path: &Path) -> Result<([f32; 3], [f32; 3])> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let config: PreprocessorConfig =
        serde_json::from_str(&json).context("Invalid preprocessor_config.json")?;

    Ok((
        per_channel(config.image_mean, DEFAULT_MEAN),
        per_channel(config.image_std, DEFAULT_STD),
    ))
}

fn per_channel(values: Option<Vec<f32>>, default: [f32; 3]) -> [f32; 3] {
    match values.as_deref() {
        Some([r, g, b]) => [*r, *g, *b],
        Some([v]) => [*v; 3],
        _ => default,
    }
}
