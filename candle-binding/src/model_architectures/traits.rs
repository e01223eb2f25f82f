//! Model Architecture Traits and Type Definitions

use crate::core::unified_error::{ModelErrorType, UnifiedResult};
use std::fmt;

/// The three sentiment models the router can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelVariant {
    /// Full-precision BERT: highest accuracy, highest carbon cost
    Full,
    /// DistilBERT: balanced accuracy and cost
    Balanced,
    /// 8-bit quantized DistilBERT: lowest cost
    Eco,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 3] = [
        ModelVariant::Full,
        ModelVariant::Balanced,
        ModelVariant::Eco,
    ];

    /// Label reported back to the caller as `model_used`
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelVariant::Full => "BERT (High Accuracy, High Carbon)",
            ModelVariant::Balanced => "DistilBERT (Balanced)",
            ModelVariant::Eco => "Quantized DistilBERT (Low Carbon)",
        }
    }

    /// Short name used in the model summary table
    pub fn short_name(&self) -> &'static str {
        match self {
            ModelVariant::Full => "BERT",
            ModelVariant::Balanced => "DistilBERT",
            ModelVariant::Eco => "Quantized DistilBERT",
        }
    }

    pub fn error_type(&self) -> ModelErrorType {
        match self {
            ModelVariant::Full => ModelErrorType::Bert,
            ModelVariant::Balanced => ModelErrorType::DistilBert,
            ModelVariant::Eco => ModelErrorType::QuantizedDistilBert,
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A loaded model that maps raw text to a sentiment label.
///
/// Label vocabularies differ between checkpoints (star ratings for the full
/// model, POSITIVE / NEGATIVE for the DistilBERT models) and are returned
/// untouched.
pub trait SentimentClassifier: Send + Sync {
    /// Which variant this classifier serves
    fn variant(&self) -> ModelVariant;

    /// Classify one text and return its label
    fn classify(&self, text: &str) -> UnifiedResult<String>;
}
