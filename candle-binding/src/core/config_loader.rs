//! Unified Configuration Loader
//!
//! Two kinds of configuration flow through the router:
//! - the router's own YAML file (`config/carbon.yaml`): which checkpoints back
//!   each model variant, device choice, and which intensity source to run;
//! - each checkpoint's `config.json`, from which the `id2label` map is read.

use crate::carbon::intensity::IntensityLevel;
use crate::core::unified_error::{config_errors, UnifiedError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Default location of the router configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/carbon.yaml";

/// Default checkpoint for the full-accuracy variant (five star-rating labels)
pub const DEFAULT_FULL_MODEL_ID: &str = "nlptown/bert-base-multilingual-uncased-sentiment";
/// Default checkpoint for the balanced and eco variants (POSITIVE / NEGATIVE)
pub const DEFAULT_DISTILBERT_MODEL_ID: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Checkpoint reference for one model variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// HuggingFace Hub id or local directory
    pub model_id: String,
}

impl ModelSpec {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
        }
    }
}

/// Checkpoints for the three variants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_full_spec")]
    pub full: ModelSpec,
    #[serde(default = "default_distilbert_spec")]
    pub balanced: ModelSpec,
    #[serde(default = "default_distilbert_spec")]
    pub eco: ModelSpec,
}

fn default_full_spec() -> ModelSpec {
    ModelSpec::new(DEFAULT_FULL_MODEL_ID)
}

fn default_distilbert_spec() -> ModelSpec {
    ModelSpec::new(DEFAULT_DISTILBERT_MODEL_ID)
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            full: default_full_spec(),
            balanced: default_distilbert_spec(),
            eco: default_distilbert_spec(),
        }
    }
}

/// Which intensity source the router samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntensitySourceConfig {
    /// Uniformly random level, optionally reproducible
    Random {
        #[serde(default)]
        seed: Option<u64>,
    },
    /// Always the same level
    Fixed { level: IntensityLevel },
}

impl Default for IntensitySourceConfig {
    fn default() -> Self {
        IntensitySourceConfig::Random { seed: None }
    }
}

/// Router configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonRouterConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default = "default_use_cpu")]
    pub use_cpu: bool,
    #[serde(default = "default_max_sequence_length")]
    pub max_sequence_length: usize,
    #[serde(default)]
    pub intensity: IntensitySourceConfig,
}

fn default_use_cpu() -> bool {
    true
}

fn default_max_sequence_length() -> usize {
    512
}

impl Default for CarbonRouterConfig {
    fn default() -> Self {
        Self {
            models: ModelsConfig::default(),
            use_cpu: default_use_cpu(),
            max_sequence_length: default_max_sequence_length(),
            intensity: IntensitySourceConfig::default(),
        }
    }
}

impl CarbonRouterConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, UnifiedError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), UnifiedError> {
        for (field, spec) in [
            ("models.full.model_id", &self.models.full),
            ("models.balanced.model_id", &self.models.balanced),
            ("models.eco.model_id", &self.models.eco),
        ] {
            if spec.model_id.trim().is_empty() {
                return Err(UnifiedError::Validation {
                    field: field.to_string(),
                    expected: "non-empty model id".to_string(),
                    actual: "empty string".to_string(),
                    context: None,
                });
            }
        }

        if self.max_sequence_length == 0 {
            return Err(UnifiedError::Validation {
                field: "max_sequence_length".to_string(),
                expected: "positive integer".to_string(),
                actual: "0".to_string(),
                context: None,
            });
        }

        Ok(())
    }
}

/// Unified configuration loader for checkpoint config.json files
pub struct UnifiedConfigLoader;

impl UnifiedConfigLoader {
    /// Load and parse JSON configuration file from model path
    pub fn load_json_config(model_path: &str) -> Result<Value, UnifiedError> {
        let config_path = Path::new(model_path).join("config.json");
        Self::load_json_config_from_path(&config_path.to_string_lossy())
    }

    /// Load and parse JSON configuration file from specific path
    pub fn load_json_config_from_path(config_path: &str) -> Result<Value, UnifiedError> {
        let config_content = std::fs::read_to_string(config_path)
            .map_err(|_e| config_errors::file_not_found(config_path))?;

        serde_json::from_str(&config_content)
            .map_err(|e| config_errors::invalid_json(config_path, &e.to_string()))
    }

    /// Extract id2label mapping as HashMap<usize, String>
    pub fn extract_id2label_map(
        config_json: &Value,
    ) -> Result<HashMap<usize, String>, UnifiedError> {
        let id2label_json = config_json
            .get("id2label")
            .ok_or_else(|| config_errors::missing_field("id2label", "config.json"))?;

        let obj = id2label_json.as_object().ok_or_else(|| {
            config_errors::invalid_json("config.json", "id2label is not an object")
        })?;

        let mut id2label = HashMap::with_capacity(obj.len());
        for (id_str, label_value) in obj {
            let id: usize = id_str.parse().map_err(|e| {
                config_errors::invalid_json(
                    "config.json",
                    &format!("Invalid id in id2label: {}", e),
                )
            })?;

            let label = label_value
                .as_str()
                .ok_or_else(|| {
                    config_errors::invalid_json("config.json", "Label value is not a string")
                })?
                .to_string();

            id2label.insert(id, label);
        }

        Ok(id2label)
    }

    /// Extract labels as Vec<String> ordered by class id
    pub fn extract_sorted_labels(config_json: &Value) -> Result<Vec<String>, UnifiedError> {
        let id2label = Self::extract_id2label_map(config_json)?;

        let mut labels: Vec<(usize, String)> = id2label.into_iter().collect();
        labels.sort_by_key(|&(id, _)| id);

        // Class ids must be dense so argmax indices map straight onto labels
        for (expected, (id, _)) in labels.iter().enumerate() {
            if *id != expected {
                return Err(config_errors::invalid_json(
                    "config.json",
                    &format!("id2label is missing class id {}", expected),
                ));
            }
        }

        Ok(labels.into_iter().map(|(_, label)| label).collect())
    }

    /// Extract an integer dimension (e.g. `hidden_size`, `dim`) from config
    pub fn extract_dimension(config_json: &Value, key: &str) -> Result<usize, UnifiedError> {
        config_json
            .get(key)
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .ok_or_else(|| config_errors::missing_field(key, "config.json"))
    }
}

/// Global configuration loader for the router's YAML file
pub struct GlobalConfigLoader;

impl GlobalConfigLoader {
    /// Load router configuration from the default path
    pub fn load_router_config() -> Result<CarbonRouterConfig, UnifiedError> {
        Self::load_router_config_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load router configuration from a specific YAML file
    pub fn load_router_config_from_path(
        config_path: &str,
    ) -> Result<CarbonRouterConfig, UnifiedError> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|_| config_errors::file_not_found(config_path))?;

        CarbonRouterConfig::from_yaml_str(&config_str).map_err(|e| match e {
            UnifiedError::Configuration { source, .. } => {
                config_errors::invalid_yaml(config_path, &source.to_string())
            }
            other => other,
        })
    }

    /// Load router configuration with fallback to defaults
    pub fn load_router_config_safe() -> CarbonRouterConfig {
        match Self::load_router_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default router configuration");
                CarbonRouterConfig::default()
            }
        }
    }
}

/// Load labels from model config.json, ordered by class id
pub fn load_labels_from_model_config(model_path: &str) -> Result<Vec<String>, UnifiedError> {
    let config_json = UnifiedConfigLoader::load_json_config(model_path)?;
    UnifiedConfigLoader::extract_sorted_labels(&config_json)
}
