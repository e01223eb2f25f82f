//! Checkpoint resolution shared by the sentiment classifiers
//!
//! A model id is either a local directory or a HuggingFace Hub repository.
//! Safetensors weights are preferred; PyTorch `.bin` weights are the fallback.

use anyhow::{Error as E, Result};
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use hf_hub::{api::sync::Api, Repo, RepoType};
use std::path::{Path, PathBuf};

/// Files that make up one checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointFiles {
    pub config: PathBuf,
    pub tokenizer: PathBuf,
    pub weights: PathBuf,
    /// Weights are a PyTorch pickle rather than safetensors
    pub use_pth: bool,
}

impl CheckpointFiles {
    /// Resolve model files (HuggingFace Hub or local)
    pub fn resolve(model_id: &str) -> Result<Self> {
        let local = Path::new(model_id);
        if local.exists() {
            Self::resolve_local(local)
        } else {
            Self::resolve_hub(model_id)
        }
    }

    fn resolve_local(dir: &Path) -> Result<Self> {
        let safetensors = dir.join("model.safetensors");
        let pytorch = dir.join("pytorch_model.bin");

        let (weights, use_pth) = if safetensors.exists() {
            (safetensors, false)
        } else if pytorch.exists() {
            (pytorch, true)
        } else {
            return Err(E::msg(format!(
                "No model weights found in {}",
                dir.display()
            )));
        };

        Ok(Self {
            config: dir.join("config.json"),
            tokenizer: dir.join("tokenizer.json"),
            weights,
            use_pth,
        })
    }

    fn resolve_hub(model_id: &str) -> Result<Self> {
        let repo = Repo::with_revision(model_id.to_string(), RepoType::Model, "main".to_string());
        let api = Api::new()?.repo(repo);

        let config = api.get("config.json")?;
        let tokenizer = api.get("tokenizer.json")?;

        let (weights, use_pth) = match api.get("model.safetensors") {
            Ok(weights) => (weights, false),
            Err(err) => {
                tracing::debug!(
                    model_id,
                    error = %err,
                    "safetensors not found, trying PyTorch weights"
                );
                (api.get("pytorch_model.bin")?, true)
            }
        };

        Ok(Self {
            config,
            tokenizer,
            weights,
            use_pth,
        })
    }

    /// Directory holding `config.json`, used for label lookup
    pub fn config_dir(&self) -> Result<&Path> {
        self.config
            .parent()
            .ok_or_else(|| E::msg(format!("{} has no parent directory", self.config.display())))
    }

    /// Open the weights as an F32 var builder on `device`
    pub fn var_builder(&self, device: &Device) -> Result<VarBuilder<'static>> {
        let vb = if self.use_pth {
            VarBuilder::from_pth(&self.weights, DType::F32, device)?
        } else {
            // SAFETY: the weights file is not modified while mapped
            unsafe {
                VarBuilder::from_mmaped_safetensors(&[self.weights.clone()], DType::F32, device)?
            }
        };
        Ok(vb)
    }
}

/// Pick the compute device
pub fn select_device(use_cpu: bool) -> Result<Device> {
    if use_cpu {
        Ok(Device::Cpu)
    } else {
        Ok(Device::cuda_if_available(0)?)
    }
}

/// Index of the largest value; ties resolve to the lowest index
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (idx, &value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((idx, value)),
        })
        .map(|(idx, _)| idx)
}

/// Softmax over `(1, num_classes)` logits; returns the winning class and its probability
pub fn top_class(logits: &Tensor) -> Result<(usize, f32)> {
    let probabilities = candle_nn::ops::softmax(logits, D::Minus1)?
        .squeeze(0)?
        .to_vec1::<f32>()?;
    let idx = argmax(&probabilities).ok_or_else(|| E::msg("empty logits"))?;
    Ok((idx, probabilities[idx]))
}
