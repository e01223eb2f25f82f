//! Full-precision BERT sentiment classifier
//!
//! Follows Candle's official BERT pattern: encoder, tanh pooler over the CLS
//! token, then a linear classification head. The label vocabulary comes from
//! the checkpoint's `id2label` map.

use crate::core::config_loader::load_labels_from_model_config;
use crate::core::tokenization::{SentimentTokenizer, TokenizationConfig};
use crate::core::unified_error::{model_errors, ErrorUnification, ModelErrorType, UnifiedResult};
use crate::model_architectures::traditional::checkpoint::{
    select_device, top_class, CheckpointFiles,
};
use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
use anyhow::{Error as E, Result};
use candle_core::{Device, IndexOp};
use candle_nn::{Linear, Module, VarBuilder};
use candle_transformers::models::bert::{BertModel, Config};

/// BERT sequence classifier backing the high-accuracy variant
pub struct BertSentimentClassifier {
    bert: BertModel,
    /// BERT pooler layer (CLS token -> pooled output)
    pooler: Linear,
    classifier: Linear,
    tokenizer: SentimentTokenizer,
    labels: Vec<String>,
    device: Device,
}

impl BertSentimentClassifier {
    /// Load a checkpoint from a local directory or the HuggingFace Hub
    pub fn new(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> UnifiedResult<Self> {
        Self::load(model_id, use_cpu, max_sequence_length)
            .map_err(|e| model_errors::load_failure(ModelErrorType::Bert, model_id, &e.to_string()))
    }

    fn load(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> Result<Self> {
        let device = select_device(use_cpu)?;
        tracing::info!(model_id, ?device, "loading BERT sentiment classifier");

        let files = CheckpointFiles::resolve(model_id)?;
        let config: Config = serde_json::from_str(&std::fs::read_to_string(&files.config)?)?;
        let labels = load_labels_from_model_config(&files.config_dir()?.to_string_lossy())?;
        let tokenizer = SentimentTokenizer::from_file(
            &files.tokenizer.to_string_lossy(),
            TokenizationConfig::with_max_length(max_sequence_length),
            device.clone(),
        )?;
        let vb = files.var_builder(&device)?;

        Self::from_parts(vb, &config, tokenizer, labels)
    }

    /// Assemble the classifier from already-resolved parts
    pub fn from_parts(
        vb: VarBuilder,
        config: &Config,
        tokenizer: SentimentTokenizer,
        labels: Vec<String>,
    ) -> Result<Self> {
        if labels.is_empty() {
            return Err(E::msg("BERT checkpoint declares no labels"));
        }

        let bert = BertModel::load(vb.pp("bert"), config)?;
        let pooler = candle_nn::linear(
            config.hidden_size,
            config.hidden_size,
            vb.pp("bert.pooler.dense"),
        )?;
        let classifier = candle_nn::linear(config.hidden_size, labels.len(), vb.pp("classifier"))?;
        let device = vb.device().clone();

        Ok(Self {
            bert,
            pooler,
            classifier,
            tokenizer,
            labels,
            device,
        })
    }

    /// Predicted class index and its softmax probability
    pub fn predict(&self, text: &str) -> Result<(usize, f32)> {
        let (token_ids, attention_mask) = self.tokenizer.encode_to_tensors(text)?;
        let token_type_ids = token_ids.zeros_like()?;

        let hidden = self
            .bert
            .forward(&token_ids, &token_type_ids, Some(&attention_mask))?;

        let cls = hidden.i((.., 0))?;
        let pooled = self.pooler.forward(&cls)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;

        top_class(&logits)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn device(&self) -> &Device {
        &self.device
    }
}

impl SentimentClassifier for BertSentimentClassifier {
    fn variant(&self) -> ModelVariant {
        ModelVariant::Full
    }

    fn classify(&self, text: &str) -> UnifiedResult<String> {
        let (idx, _) = self
            .predict(text)
            .with_model_context(ModelErrorType::Bert, "model inference", Some("BERT forward"))?;
        self.labels.get(idx).cloned().ok_or_else(|| {
            model_errors::inference_failure(
                ModelErrorType::Bert,
                "argmax",
                &format!("class index {} has no label", idx),
            )
        })
    }
}

impl std::fmt::Debug for BertSentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BertSentimentClassifier")
            .field("labels", &self.labels)
            .field("device", &self.device)
            .finish()
    }
}
