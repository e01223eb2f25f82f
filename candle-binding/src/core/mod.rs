//! # Core Business Logic Layer

// Core modules
pub mod config_loader;
pub mod tokenization;
pub mod unified_error;

// Re-export unified configuration loader
pub use config_loader::{
    load_labels_from_model_config, CarbonRouterConfig, GlobalConfigLoader,
    IntensitySourceConfig, ModelSpec, ModelsConfig, UnifiedConfigLoader,
};

pub use unified_error::{
    config_errors, intensity_errors, model_errors, ConfigErrorType, ErrorUnification,
    ModelErrorType, UnifiedError, UnifiedResult,
};

pub use tokenization::{SentimentTokenizer, TokenizationConfig, TokenizationResult};
