//! DistilBERT sentiment classifier
//!
//! The HuggingFace `DistilBertForSequenceClassification` layout: the
//! `distilbert` encoder, then `pre_classifier` (dim -> dim, ReLU) and
//! `classifier` (dim -> num_labels) applied to the first token.

use crate::core::config_loader::{load_labels_from_model_config, UnifiedConfigLoader};
use crate::core::tokenization::{SentimentTokenizer, TokenizationConfig};
use crate::core::unified_error::{model_errors, ErrorUnification, ModelErrorType, UnifiedResult};
use crate::model_architectures::traditional::checkpoint::{
    select_device, top_class, CheckpointFiles,
};
use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
use anyhow::{Error as E, Result};
use candle_core::{Device, IndexOp, Tensor};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use serde_json::Value;

/// Everything needed to build a DistilBERT classifier, before weights are mapped
pub struct DistilBertCheckpoint {
    pub files: CheckpointFiles,
    pub config_json: Value,
    pub tokenizer: SentimentTokenizer,
    pub labels: Vec<String>,
    pub device: Device,
}

impl DistilBertCheckpoint {
    pub fn resolve(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> Result<Self> {
        let device = select_device(use_cpu)?;
        let files = CheckpointFiles::resolve(model_id)?;
        let config_dir = files.config_dir()?.to_string_lossy().to_string();

        let config_json = UnifiedConfigLoader::load_json_config(&config_dir)?;
        let labels = load_labels_from_model_config(&config_dir)?;
        let tokenizer = SentimentTokenizer::from_file(
            &files.tokenizer.to_string_lossy(),
            TokenizationConfig::with_max_length(max_sequence_length),
            device.clone(),
        )?;

        Ok(Self {
            files,
            config_json,
            tokenizer,
            labels,
            device,
        })
    }
}

/// DistilBERT encoder plus tokenizer; yields the first-token hidden state
pub struct DistilBertEncoder {
    model: DistilBertModel,
    tokenizer: SentimentTokenizer,
    dim: usize,
}

impl DistilBertEncoder {
    /// `config_json` is the checkpoint's `config.json`
    pub fn load(
        vb: VarBuilder,
        config_json: &Value,
        tokenizer: SentimentTokenizer,
    ) -> Result<Self> {
        let config: Config = serde_json::from_value(config_json.clone())?;
        // `Config` keeps its fields private, so the hidden width is read from the raw JSON
        let dim = UnifiedConfigLoader::extract_dimension(config_json, "dim")?;
        let model = DistilBertModel::load(vb.pp("distilbert"), &config)?;

        Ok(Self {
            model,
            tokenizer,
            dim,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Hidden state of the first token, shape `(1, dim)`
    pub fn encode_first_token(&self, text: &str) -> Result<Tensor> {
        let (token_ids, attention_mask) = self.tokenizer.encode_to_tensors(text)?;
        // DistilBERT expects 1 where attention is blocked
        let blocked = attention_mask.eq(0u32)?;
        let hidden = self.model.forward(&token_ids, &blocked)?;
        Ok(hidden.i((.., 0))?)
    }
}

/// Full-precision DistilBERT backing the balanced variant
pub struct DistilBertSentimentClassifier {
    encoder: DistilBertEncoder,
    pre_classifier: Linear,
    classifier: Linear,
    labels: Vec<String>,
}

impl DistilBertSentimentClassifier {
    /// Load a checkpoint from a local directory or the HuggingFace Hub
    pub fn new(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> UnifiedResult<Self> {
        Self::load(model_id, use_cpu, max_sequence_length).map_err(|e| {
            model_errors::load_failure(ModelErrorType::DistilBert, model_id, &e.to_string())
        })
    }

    fn load(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> Result<Self> {
        tracing::info!(model_id, "loading DistilBERT sentiment classifier");
        let checkpoint = DistilBertCheckpoint::resolve(model_id, use_cpu, max_sequence_length)?;
        let vb = checkpoint.files.var_builder(&checkpoint.device)?;
        Self::from_parts(vb, &checkpoint.config_json, checkpoint.tokenizer, checkpoint.labels)
    }

    /// Assemble the classifier from already-resolved parts
    pub fn from_parts(
        vb: VarBuilder,
        config_json: &Value,
        tokenizer: SentimentTokenizer,
        labels: Vec<String>,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(E::msg("DistilBERT checkpoint declares no labels"));
        }

        let encoder = DistilBertEncoder::load(vb.clone(), config_json, tokenizer)?;
        let dim = encoder.dim();
        let pre_classifier = candle_nn::linear(dim, dim, vb.pp("pre_classifier"))?;
        let classifier = candle_nn::linear(dim, labels.len(), vb.pp("classifier"))?;

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            labels,
        })
    }

    /// Predicted class index and its softmax probability
    pub fn predict(&self, text: &str) -> Result<(usize, f32)> {
        let first_token = self.encoder.encode_first_token(text)?;
        let hidden = self.pre_classifier.forward(&first_token)?.relu()?;
        let logits = self.classifier.forward(&hidden)?;
        top_class(&logits)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl SentimentClassifier for DistilBertSentimentClassifier {
    fn variant(&self) -> ModelVariant {
        ModelVariant::Balanced
    }

    fn classify(&self, text: &str) -> UnifiedResult<String> {
        let (idx, _) = self.predict(text).with_model_context(
            ModelErrorType::DistilBert,
            "model inference",
            Some("DistilBERT forward"),
        )?;
        self.labels.get(idx).cloned().ok_or_else(|| {
            model_errors::inference_failure(
                ModelErrorType::DistilBert,
                "argmax",
                &format!("class index {} has no label", idx),
            )
        })
    }
}

impl std::fmt::Debug for DistilBertSentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistilBertSentimentClassifier")
            .field("dim", &self.encoder.dim())
            .field("labels", &self.labels)
            .finish()
    }
}
