//! # Model Architectures

pub mod registry;
pub mod routing;
pub mod traditional;
pub mod traits;

// Re-export types from traits module
pub use traits::{ModelVariant, SentimentClassifier};

pub use registry::{BundleLoader, CandleBundleLoader, ModelBundle, ModelRegistry};

// Re-export routing functionality
pub use routing::{select_model, CarbonAwareRouter, InferenceResult};
