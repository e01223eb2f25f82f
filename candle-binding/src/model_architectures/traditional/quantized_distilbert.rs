//! 8-bit quantized DistilBERT sentiment classifier
//!
//! Mirrors dynamic int8 quantization of linear layers: every linear weight in
//! the encoder is stored through a Q8_0 round trip, and the classification
//! head runs as real Q8_0 matmuls. Embeddings and layer norms stay F32.

use crate::core::config_loader::UnifiedConfigLoader;
use crate::core::tokenization::SentimentTokenizer;
use crate::core::unified_error::{model_errors, ErrorUnification, ModelErrorType, UnifiedResult};
use crate::model_architectures::traditional::checkpoint::{top_class, CheckpointFiles};
use crate::model_architectures::traditional::distilbert::{DistilBertCheckpoint, DistilBertEncoder};
use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
use anyhow::{Error as E, Result};
use candle_core::quantized::{GgmlDType, QMatMul, QTensor};
use candle_core::{DType, Device, Module, Tensor};
use candle_nn::VarBuilder;
use serde_json::Value;
use std::collections::HashMap;

/// Label for class index 1; every other index reads as [`NEGATIVE_LABEL`]
pub const POSITIVE_LABEL: &str = "POSITIVE";
pub const NEGATIVE_LABEL: &str = "NEGATIVE";

/// Quantization format used for linear weights
pub const QUANTIZED_DTYPE: GgmlDType = GgmlDType::Q8_0;

/// Linear layer with a Q8_0 weight and an F32 bias
pub struct QuantizedLinear {
    weight: QMatMul,
    bias: Tensor,
}

impl QuantizedLinear {
    /// `weight` is `(out_features, in_features)` as stored by PyTorch
    pub fn new(weight: &Tensor, bias: Tensor) -> Result<Self> {
        let qtensor = QTensor::quantize(weight, QUANTIZED_DTYPE)?;
        Ok(Self {
            weight: QMatMul::from_qtensor(qtensor)?,
            bias,
        })
    }

    /// Load `{prefix}.weight` and `{prefix}.bias` from `vb`
    pub fn load(in_dim: usize, out_dim: usize, vb: VarBuilder) -> Result<Self> {
        let weight = vb.get((out_dim, in_dim), "weight")?;
        let bias = vb.get(out_dim, "bias")?;
        Self::new(&weight, bias)
    }
}

impl Module for QuantizedLinear {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        self.weight
            .forward(&xs.contiguous()?)?
            .broadcast_add(&self.bias)
    }
}

/// True for weights that dynamic quantization would touch
fn is_quantizable(name: &str, tensor: &Tensor) -> bool {
    name.ends_with(".weight")
        && !name.contains("embeddings")
        && tensor.rank() == 2
        && tensor.dims()[1] % QUANTIZED_DTYPE.block_size() == 0
}

/// Replace every quantizable linear weight by its Q8_0 round trip
pub fn quantize_weights(
    tensors: HashMap<String, Tensor>,
    device: &Device,
) -> Result<HashMap<String, Tensor>> {
    let mut quantized = 0usize;
    let mut out = HashMap::with_capacity(tensors.len());

    for (name, tensor) in tensors {
        let tensor = tensor.to_dtype(DType::F32)?.to_device(device)?;
        let tensor = if is_quantizable(&name, &tensor) {
            quantized += 1;
            QTensor::quantize(&tensor, QUANTIZED_DTYPE)?.dequantize(device)?
        } else {
            tensor
        };
        out.insert(name, tensor);
    }

    tracing::debug!(quantized, total = out.len(), "applied Q8_0 weight quantization");
    Ok(out)
}

fn read_tensors(files: &CheckpointFiles, device: &Device) -> Result<HashMap<String, Tensor>> {
    if files.use_pth {
        Ok(candle_core::pickle::read_all(&files.weights)?
            .into_iter()
            .collect())
    } else {
        Ok(candle_core::safetensors::load(&files.weights, device)?)
    }
}

/// Quantized DistilBERT backing the eco variant.
///
/// Output labels are fixed to the binary SST-2 vocabulary regardless of the
/// checkpoint's `id2label`.
pub struct QuantizedDistilBertClassifier {
    encoder: DistilBertEncoder,
    pre_classifier: QuantizedLinear,
    classifier: QuantizedLinear,
    num_classes: usize,
}

impl QuantizedDistilBertClassifier {
    /// Load and quantize a checkpoint from a local directory or the HuggingFace Hub
    pub fn new(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> UnifiedResult<Self> {
        Self::load(model_id, use_cpu, max_sequence_length).map_err(|e| {
            model_errors::load_failure(
                ModelErrorType::QuantizedDistilBert,
                model_id,
                &e.to_string(),
            )
        })
    }

    fn load(model_id: &str, use_cpu: bool, max_sequence_length: usize) -> Result<Self> {
        tracing::info!(model_id, "loading quantized DistilBERT sentiment classifier");
        let checkpoint = DistilBertCheckpoint::resolve(model_id, use_cpu, max_sequence_length)?;

        let tensors = read_tensors(&checkpoint.files, &checkpoint.device)?;
        let tensors = quantize_weights(tensors, &checkpoint.device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &checkpoint.device);

        Self::from_parts(
            vb,
            &checkpoint.config_json,
            checkpoint.tokenizer,
            checkpoint.labels.len(),
        )
    }

    /// Assemble the classifier from already-resolved parts; the head is quantized here
    pub fn from_parts(
        vb: VarBuilder,
        config_json: &Value,
        tokenizer: SentimentTokenizer,
        num_classes: usize,
    ) -> Result<Self> {
        if num_classes == 0 {
            return Err(E::msg("DistilBERT checkpoint declares no labels"));
        }

        let dim = UnifiedConfigLoader::extract_dimension(config_json, "dim")?;
        if dim % QUANTIZED_DTYPE.block_size() != 0 {
            return Err(E::msg(format!(
                "hidden width {} is not a multiple of the Q8_0 block size {}",
                dim,
                QUANTIZED_DTYPE.block_size()
            )));
        }

        let encoder = DistilBertEncoder::load(vb.clone(), config_json, tokenizer)?;
        let pre_classifier = QuantizedLinear::load(dim, dim, vb.pp("pre_classifier"))?;
        let classifier = QuantizedLinear::load(dim, num_classes, vb.pp("classifier"))?;

        Ok(Self {
            encoder,
            pre_classifier,
            classifier,
            num_classes,
        })
    }

    /// Predicted class index and its softmax probability
    pub fn predict(&self, text: &str) -> Result<(usize, f32)> {
        let first_token = self.encoder.encode_first_token(text)?;
        let hidden = self.pre_classifier.forward(&first_token)?.relu()?;
        let logits = self.classifier.forward(&hidden)?;
        top_class(&logits)
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Map a class index onto the fixed binary vocabulary
    pub fn label_for(idx: usize) -> &'static str {
        if idx == 1 {
            POSITIVE_LABEL
        } else {
            NEGATIVE_LABEL
        }
    }
}

impl SentimentClassifier for QuantizedDistilBertClassifier {
    fn variant(&self) -> ModelVariant {
        ModelVariant::Eco
    }

    fn classify(&self, text: &str) -> UnifiedResult<String> {
        let (idx, _) = self.predict(text).with_model_context(
            ModelErrorType::QuantizedDistilBert,
            "model inference",
            Some("quantized DistilBERT forward"),
        )?;
        Ok(Self::label_for(idx).to_string())
    }
}

impl std::fmt::Debug for QuantizedDistilBertClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuantizedDistilBertClassifier")
            .field("dim", &self.encoder.dim())
            .field("dtype", &QUANTIZED_DTYPE)
            .field("num_classes", &self.num_classes)
            .finish()
    }
}
