//! Model Registry
//!
//! Loads the three sentiment models at most once per registry and hands out
//! the same shared bundle on every later call. A failed load is not cached,
//! so the next call retries.

use crate::core::config_loader::CarbonRouterConfig;
use crate::core::unified_error::{ModelErrorType, UnifiedResult};
use crate::model_error;
use crate::model_architectures::traditional::{
    BertSentimentClassifier, DistilBertSentimentClassifier, QuantizedDistilBertClassifier,
};
use crate::model_architectures::traits::{ModelVariant, SentimentClassifier};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

/// The three loaded models, one per variant
#[derive(Clone)]
pub struct ModelBundle {
    pub full: Arc<dyn SentimentClassifier>,
    pub balanced: Arc<dyn SentimentClassifier>,
    pub eco: Arc<dyn SentimentClassifier>,
}

impl ModelBundle {
    pub fn new(
        full: Arc<dyn SentimentClassifier>,
        balanced: Arc<dyn SentimentClassifier>,
        eco: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            full,
            balanced,
            eco,
        }
    }

    /// Model serving `variant`
    pub fn get(&self, variant: ModelVariant) -> &Arc<dyn SentimentClassifier> {
        match variant {
            ModelVariant::Full => &self.full,
            ModelVariant::Balanced => &self.balanced,
            ModelVariant::Eco => &self.eco,
        }
    }

    /// Every slot must hold a classifier of its own variant
    pub fn validate(&self) -> UnifiedResult<()> {
        for variant in ModelVariant::ALL {
            let actual = self.get(variant).variant();
            if actual != variant {
                return Err(model_error!(
                    ModelErrorType::Registry,
                    "bundle assembly",
                    format!("slot {:?} holds a {:?} classifier", variant, actual)
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ModelBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBundle")
            .field("full", &self.full.variant())
            .field("balanced", &self.balanced.variant())
            .field("eco", &self.eco.variant())
            .finish()
    }
}

/// Produces a fresh [`ModelBundle`]; called by the registry at most once per success
pub trait BundleLoader: Send + Sync {
    fn load_bundle(&self) -> UnifiedResult<ModelBundle>;
}

impl<F> BundleLoader for F
where
    F: Fn() -> UnifiedResult<ModelBundle> + Send + Sync,
{
    fn load_bundle(&self) -> UnifiedResult<ModelBundle> {
        self()
    }
}

/// Loads the configured checkpoints through candle
#[derive(Debug, Clone)]
pub struct CandleBundleLoader {
    config: CarbonRouterConfig,
}

impl CandleBundleLoader {
    pub fn new(config: CarbonRouterConfig) -> Self {
        Self { config }
    }
}

impl BundleLoader for CandleBundleLoader {
    fn load_bundle(&self) -> UnifiedResult<ModelBundle> {
        let models = &self.config.models;
        let use_cpu = self.config.use_cpu;
        let max_len = self.config.max_sequence_length;

        let full = BertSentimentClassifier::new(&models.full.model_id, use_cpu, max_len)?;
        let balanced =
            DistilBertSentimentClassifier::new(&models.balanced.model_id, use_cpu, max_len)?;
        let eco = QuantizedDistilBertClassifier::new(&models.eco.model_id, use_cpu, max_len)?;

        Ok(ModelBundle::new(
            Arc::new(full),
            Arc::new(balanced),
            Arc::new(eco),
        ))
    }
}

/// Memoizing holder for the model bundle
pub struct ModelRegistry {
    bundle: OnceLock<Arc<ModelBundle>>,
    loader: Box<dyn BundleLoader>,
    initialization_lock: Mutex<()>,
}

impl ModelRegistry {
    pub fn new(loader: impl BundleLoader + 'static) -> Self {
        Self {
            bundle: OnceLock::new(),
            loader: Box::new(loader),
            initialization_lock: Mutex::new(()),
        }
    }

    /// Registry backed by the candle checkpoints named in `config`
    pub fn from_config(config: CarbonRouterConfig) -> Self {
        Self::new(CandleBundleLoader::new(config))
    }

    /// Return the bundle, loading it on first use.
    ///
    /// Concurrent first calls block on the initialization lock; only one of
    /// them runs the loader and all of them receive the same `Arc`.
    pub fn load(&self) -> UnifiedResult<Arc<ModelBundle>> {
        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        let _guard = self.initialization_lock.lock();

        if let Some(bundle) = self.bundle.get() {
            return Ok(Arc::clone(bundle));
        }

        tracing::info!("loading sentiment model bundle");
        let bundle = self.loader.load_bundle()?;
        bundle.validate()?;
        let bundle = Arc::new(bundle);
        // Only this thread can set the slot while the lock is held
        let bundle = Arc::clone(self.bundle.get_or_init(|| bundle));
        tracing::info!(?bundle, "sentiment model bundle ready");

        Ok(bundle)
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.get().is_some()
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
