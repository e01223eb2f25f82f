//! FFI Initialization Functions
//!
//! The router is built once into a process-global slot. Reads after
//! initialization are a single atomic load through `OnceLock`.

use std::ffi::{c_char, CStr};
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};

use crate::core::config_loader::{CarbonRouterConfig, GlobalConfigLoader};
use crate::core::unified_error::UnifiedResult;
use crate::ffi_error;
use crate::model_architectures::registry::ModelRegistry;
use crate::model_architectures::routing::CarbonAwareRouter;

/// Write-once holder for a shared router
pub struct RouterSlot {
    router: OnceLock<Arc<CarbonAwareRouter>>,
    initialization_lock: Mutex<()>,
}

impl RouterSlot {
    pub const fn new() -> Self {
        Self {
            router: OnceLock::new(),
            initialization_lock: Mutex::new(()),
        }
    }

    pub fn get(&self) -> Option<Arc<CarbonAwareRouter>> {
        self.router.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.router.get().is_some()
    }

    /// Run `build` unless a router is already installed.
    ///
    /// `build` runs at most once per successful initialization; a failed
    /// build leaves the slot empty.
    pub fn get_or_try_init<F>(&self, build: F) -> UnifiedResult<Arc<CarbonAwareRouter>>
    where
        F: FnOnce() -> UnifiedResult<CarbonAwareRouter>,
    {
        if let Some(router) = self.router.get() {
            return Ok(Arc::clone(router));
        }

        let _guard = self.initialization_lock.lock();

        if let Some(router) = self.router.get() {
            return Ok(Arc::clone(router));
        }

        let router = Arc::new(build()?);
        Ok(Arc::clone(self.router.get_or_init(|| router)))
    }
}

impl Default for RouterSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Router used by the C entry points
pub static CARBON_ROUTER: RouterSlot = RouterSlot::new();

/// Read the router configuration named by a C path; null selects defaults
pub fn config_from_c_path(config_path: *const c_char) -> UnifiedResult<CarbonRouterConfig> {
    if config_path.is_null() {
        return Ok(CarbonRouterConfig::default());
    }

    let path = unsafe { CStr::from_ptr(config_path) }
        .to_str()
        .map_err(|e| ffi_error!("init_carbon_router", format!("config path is not UTF-8: {}", e)))?;

    GlobalConfigLoader::load_router_config_from_path(path)
}

/// Build the registry and router described by `config`
pub fn build_router(config: &CarbonRouterConfig) -> UnifiedResult<CarbonAwareRouter> {
    let registry = ModelRegistry::from_config(config.clone());
    CarbonAwareRouter::from_registry(&registry, config)
}

/// Initialize the carbon-aware router
///
/// Repeated calls after a successful initialization return `true` without
/// reloading anything.
///
/// # Safety
/// - `config_path` must be a valid null-terminated C string or null
#[no_mangle]
pub extern "C" fn init_carbon_router(config_path: *const c_char) -> bool {
    if CARBON_ROUTER.is_initialized() {
        return true;
    }

    let result = CARBON_ROUTER.get_or_try_init(|| {
        let config = config_from_c_path(config_path)?;
        build_router(&config)
    });

    match result {
        Ok(router) => {
            tracing::info!(?router, "carbon-aware router initialized");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize carbon-aware router");
            false
        }
    }
}

/// Whether `init_carbon_router` has succeeded
#[no_mangle]
pub extern "C" fn is_carbon_router_initialized() -> bool {
    CARBON_ROUTER.is_initialized()
}
