//! Carbon-aware routing
//!
//! Each call samples the current carbon intensity and dispatches the text to
//! exactly one sentiment model:
//!
//! | Intensity | Model |
//! |-----------|-------|
//! | HIGH      | quantized DistilBERT (eco) |
//! | MEDIUM    | DistilBERT (balanced) |
//! | LOW       | BERT (full) |

use crate::carbon::intensity::{build_intensity_source, IntensityLevel, IntensitySource};
use crate::core::config_loader::CarbonRouterConfig;
use crate::core::unified_error::UnifiedResult;
use crate::model_architectures::registry::{ModelBundle, ModelRegistry};
use crate::model_architectures::traits::ModelVariant;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one routed inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferenceResult {
    #[serde(skip)]
    pub model_variant: ModelVariant,
    /// Human-readable name of the model that ran
    pub model_used: String,
    /// Label exactly as the model produced it
    pub sentiment_label: String,
    pub intensity_level: IntensityLevel,
}

/// Intensity policy: pure, total over the three levels
pub fn select_model(level: IntensityLevel) -> ModelVariant {
    match level {
        IntensityLevel::High => ModelVariant::Eco,
        IntensityLevel::Medium => ModelVariant::Balanced,
        IntensityLevel::Low => ModelVariant::Full,
    }
}

/// Routes texts across a loaded [`ModelBundle`] using an [`IntensitySource`]
pub struct CarbonAwareRouter {
    bundle: Arc<ModelBundle>,
    intensity_source: Box<dyn IntensitySource>,
}

impl CarbonAwareRouter {
    pub fn new(bundle: Arc<ModelBundle>, intensity_source: Box<dyn IntensitySource>) -> Self {
        Self {
            bundle,
            intensity_source,
        }
    }

    /// Load (or reuse) the registry's bundle and attach the configured source
    pub fn from_registry(
        registry: &ModelRegistry,
        config: &CarbonRouterConfig,
    ) -> UnifiedResult<Self> {
        let bundle = registry.load()?;
        Ok(Self::new(bundle, build_intensity_source(&config.intensity)))
    }

    /// Current intensity level from the injected source
    pub fn sample_intensity(&self) -> UnifiedResult<IntensityLevel> {
        self.intensity_source.sample()
    }

    /// Same policy as the free function [`select_model`]
    pub fn select_model(&self, level: IntensityLevel) -> ModelVariant {
        select_model(level)
    }

    /// Sample, select, and invoke exactly one model.
    ///
    /// Text is passed through unchanged, including the empty string. Model
    /// errors are returned as-is; no other model is tried.
    pub fn infer(&self, text: &str) -> UnifiedResult<InferenceResult> {
        let level = self.sample_intensity()?;
        let variant = self.select_model(level);
        tracing::debug!(
            intensity = %level,
            source = self.intensity_source.name(),
            model = %variant,
            "dispatching sentiment request"
        );

        let sentiment_label = self.bundle.get(variant).classify(text)?;

        Ok(InferenceResult {
            model_variant: variant,
            model_used: variant.display_name().to_string(),
            sentiment_label,
            intensity_level: level,
        })
    }

    pub fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    pub fn intensity_source_name(&self) -> &str {
        self.intensity_source.name()
    }
}

impl std::fmt::Debug for CarbonAwareRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarbonAwareRouter")
            .field("bundle", &self.bundle)
            .field("intensity_source", &self.intensity_source.name())
            .finish()
    }
}
