//! Shared Test Fixtures for candle-binding
//!
//! Reusable mock classifiers, bundles, tiny model configurations, and
//! helpers for all test files in the crate, built on rstest.

#[cfg(test)]
pub mod fixtures {
    use crate::core::tokenization::{SentimentTokenizer, TokenizationConfig};
    use crate::core::unified_error::{model_errors, UnifiedResult};
    use crate::model_architectures::registry::ModelBundle;
    use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
    use candle_core::{Device, Tensor};
    use candle_nn::VarMap;
    use rstest::*;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tokenizers::Tokenizer;

    /// Model paths - using relative paths from candle-binding directory
    pub const MODELS_BASE_PATH: &str = "../models";

    pub const BERT_SENTIMENT_MODEL: &str = "bert-base-multilingual-uncased-sentiment";
    pub const DISTILBERT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

    /// Word-level tokenizer with BERT special tokens and a handful of words
    pub const TINY_TOKENIZER_JSON: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": {"type": "Lowercase"},
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": {
            "type": "BertProcessing",
            "sep": ["[SEP]", 2],
            "cls": ["[CLS]", 1]
        },
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {
                "[PAD]": 0, "[CLS]": 1, "[SEP]": 2, "[UNK]": 3,
                "this": 4, "movie": 5, "is": 6, "great": 7,
                "terrible": 8, "the": 9, "grid": 10, "clean": 11
            },
            "unk_token": "[UNK]"
        }
    }"#;

    /// Single-layer BERT small enough for zero-weight forward passes
    pub const TINY_BERT_CONFIG_JSON: &str = r#"{
        "vocab_size": 16,
        "hidden_size": 32,
        "num_hidden_layers": 1,
        "num_attention_heads": 2,
        "intermediate_size": 64,
        "hidden_act": "gelu",
        "hidden_dropout_prob": 0.1,
        "max_position_embeddings": 64,
        "type_vocab_size": 2,
        "initializer_range": 0.02,
        "layer_norm_eps": 1e-12,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "classifier_dropout": null,
        "model_type": "bert",
        "id2label": {"0": "1 star", "1": "2 stars", "2": "3 stars", "3": "4 stars", "4": "5 stars"}
    }"#;

    /// DistilBERT with `dim` a multiple of the Q8_0 block size
    pub const TINY_DISTILBERT_CONFIG_JSON: &str = r#"{
        "vocab_size": 16,
        "dim": 32,
        "n_layers": 1,
        "n_heads": 2,
        "hidden_dim": 64,
        "activation": "gelu",
        "max_position_embeddings": 64,
        "initializer_range": 0.02,
        "pad_token_id": 0,
        "position_embedding_type": "absolute",
        "use_cache": true,
        "model_type": "distilbert",
        "id2label": {"0": "NEGATIVE", "1": "POSITIVE"}
    }"#;

    /// Tokenizer built from [`TINY_TOKENIZER_JSON`]
    pub fn tiny_tokenizer(max_length: usize) -> SentimentTokenizer {
        let tokenizer = Tokenizer::from_bytes(TINY_TOKENIZER_JSON.as_bytes())
            .expect("tiny tokenizer JSON should parse");
        SentimentTokenizer::new(
            tokenizer,
            TokenizationConfig::with_max_length(max_length),
            Device::Cpu,
        )
        .expect("tiny tokenizer should accept truncation settings")
    }

    /// Write `config.json` and `tokenizer.json` of a tiny checkpoint into `dir`
    pub fn write_tiny_checkpoint_files(dir: &Path, config_json: &str) {
        std::fs::write(dir.join("config.json"), config_json).expect("write config.json");
        std::fs::write(dir.join("tokenizer.json"), TINY_TOKENIZER_JSON)
            .expect("write tokenizer.json");
    }

    /// Replace `name` in `varmap` with `value`, then save it as `dir/model.safetensors`
    pub fn save_varmap_with(varmap: &VarMap, dir: &Path, name: &str, value: &[f32]) {
        {
            let data = varmap.data().lock().unwrap();
            let var = data
                .get(name)
                .unwrap_or_else(|| panic!("checkpoint has no tensor named {}", name));
            let tensor = Tensor::new(value, var.device()).unwrap();
            var.set(&tensor).unwrap();
        }
        varmap.save(dir.join("model.safetensors")).unwrap();
    }

    /// Mock classifier that records how often it ran and what it saw
    pub struct CountingClassifier {
        variant: ModelVariant,
        label: String,
        calls: AtomicUsize,
        last_input: Mutex<Option<String>>,
    }

    impl CountingClassifier {
        pub fn new(variant: ModelVariant, label: &str) -> Self {
            Self {
                variant,
                label: label.to_string(),
                calls: AtomicUsize::new(0),
                last_input: Mutex::new(None),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn last_input(&self) -> Option<String> {
            self.last_input.lock().unwrap().clone()
        }
    }

    impl SentimentClassifier for CountingClassifier {
        fn variant(&self) -> ModelVariant {
            self.variant
        }

        fn classify(&self, text: &str) -> UnifiedResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_input.lock().unwrap() = Some(text.to_string());
            Ok(self.label.clone())
        }
    }

    /// Mock classifier whose every invocation fails
    pub struct FailingClassifier {
        variant: ModelVariant,
        calls: AtomicUsize,
    }

    impl FailingClassifier {
        pub fn new(variant: ModelVariant) -> Self {
            Self {
                variant,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SentimentClassifier for FailingClassifier {
        fn variant(&self) -> ModelVariant {
            self.variant
        }

        fn classify(&self, text: &str) -> UnifiedResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(model_errors::inference_failure(
                self.variant.error_type(),
                text,
                "simulated inference failure",
            ))
        }
    }

    /// Bundle of counting mocks with handles kept for assertions
    pub struct MockBundle {
        pub full: Arc<CountingClassifier>,
        pub balanced: Arc<CountingClassifier>,
        pub eco: Arc<CountingClassifier>,
        pub bundle: Arc<ModelBundle>,
    }

    impl MockBundle {
        pub fn new() -> Self {
            let full = Arc::new(CountingClassifier::new(ModelVariant::Full, "4 stars"));
            let balanced = Arc::new(CountingClassifier::new(ModelVariant::Balanced, "POSITIVE"));
            let eco = Arc::new(CountingClassifier::new(ModelVariant::Eco, "NEGATIVE"));
            let bundle = Arc::new(ModelBundle::new(
                full.clone(),
                balanced.clone(),
                eco.clone(),
            ));

            Self {
                full,
                balanced,
                eco,
                bundle,
            }
        }

        pub fn calls_for(&self, variant: ModelVariant) -> usize {
            match variant {
                ModelVariant::Full => self.full.calls(),
                ModelVariant::Balanced => self.balanced.calls(),
                ModelVariant::Eco => self.eco.calls(),
            }
        }

        pub fn total_calls(&self) -> usize {
            ModelVariant::ALL.iter().map(|v| self.calls_for(*v)).sum()
        }
    }

    /// Fresh bundle of counting mocks
    #[fixture]
    pub fn mock_bundle() -> MockBundle {
        MockBundle::new()
    }

    #[fixture]
    pub fn cpu_device() -> Device {
        Device::Cpu
    }

    /// Temporary directory fixture for file operations
    #[fixture]
    pub fn temp_dir() -> TempDir {
        tempfile::tempdir().expect("Failed to create temporary directory")
    }
}

#[cfg(test)]
pub mod test_utils {
    use super::fixtures::MODELS_BASE_PATH;
    use crate::core::unified_error::UnifiedError;
    use std::path::Path;

    /// Check if a model path exists and is accessible
    pub fn model_exists(model_path: &str) -> bool {
        let full_path = Path::new(MODELS_BASE_PATH).join(model_path);
        full_path.exists() && full_path.is_dir()
    }

    /// Full path of a model under the models directory
    pub fn model_path(model_dir: &str) -> String {
        format!("{}/{}", MODELS_BASE_PATH, model_dir)
    }

    /// Assert that an error is of expected type
    pub fn assert_error_type(error: &UnifiedError, expected_type: &str) {
        let error_string = format!("{:?}", error);
        assert!(
            error_string.contains(expected_type),
            "Expected error type '{}', got: {}",
            expected_type,
            error_string
        );
    }

    /// Create a temporary config file with given content
    pub fn create_temp_config_file(
        content: &str,
    ) -> Result<tempfile::NamedTempFile, std::io::Error> {
        use std::io::Write;
        let mut temp_file = tempfile::NamedTempFile::new()?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.flush()?;
        Ok(temp_file)
    }

    /// Generate test text of specified length
    pub fn generate_test_text(length: usize) -> String {
        let base_text = "this movie is great ";
        let mut result = String::new();
        while result.len() < length {
            result.push_str(base_text);
        }
        result.truncate(length);
        result
    }
}
