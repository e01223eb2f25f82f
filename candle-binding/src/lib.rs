// This file is a binding for the candle-core and candle-transformers libraries.
// Model loading follows https://github.com/huggingface/candle/tree/main/candle-examples/examples/bert
//
// Carbon-aware sentiment routing: every request samples the current carbon
// intensity and is answered by one of three sentiment models of decreasing
// cost (BERT, DistilBERT, 8-bit quantized DistilBERT).

pub mod carbon;
pub mod core;
pub mod ffi;
pub mod model_architectures;

#[cfg(test)]
pub mod test_fixtures;

pub use carbon::{
    DashboardReport, FixedIntensitySource, GaugeIntensitySource, IntensityLevel, IntensitySource,
    LabelIntensitySource, RandomIntensitySource,
};
pub use core::{CarbonRouterConfig, GlobalConfigLoader, UnifiedError, UnifiedResult};
pub use model_architectures::{
    select_model, BundleLoader, CarbonAwareRouter, InferenceResult, ModelBundle, ModelRegistry,
    ModelVariant, SentimentClassifier,
};
