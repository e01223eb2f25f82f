//! Tests for FFI initialization module

use super::classify::carbon_aware_classify;
use super::init::*;
use crate::carbon::intensity::FixedIntensitySource;
use crate::carbon::intensity::IntensityLevel;
use crate::core::config_loader::{CarbonRouterConfig, ModelSpec};
use crate::core::unified_error::{UnifiedError, UnifiedResult};
use crate::model_architectures::routing::CarbonAwareRouter;
use crate::test_fixtures::{fixtures::*, test_utils::*};
use rayon::prelude::*;
use rstest::*;
use serial_test::serial;
use std::ffi::CString;
use std::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn mock_router(mocks: &MockBundle) -> CarbonAwareRouter {
    CarbonAwareRouter::new(
        mocks.bundle.clone(),
        Box::new(FixedIntensitySource::new(IntensityLevel::Low)),
    )
}

/// Config whose three model paths exist but hold no weights
fn weightless_config(dir: &TempDir) -> CarbonRouterConfig {
    let path = dir.path().to_string_lossy().to_string();
    let mut config = CarbonRouterConfig::default();
    config.models.full = ModelSpec::new(&path);
    config.models.balanced = ModelSpec::new(&path);
    config.models.eco = ModelSpec::new(&path);
    config
}

#[rstest]
fn test_router_slot_initializes_once(mock_bundle: MockBundle) {
    let slot = RouterSlot::new();
    let builds = AtomicUsize::new(0);
    assert!(!slot.is_initialized());
    assert!(slot.get().is_none());

    let first = slot
        .get_or_try_init(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(mock_router(&mock_bundle))
        })
        .unwrap();
    let second = slot
        .get_or_try_init(|| {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(mock_router(&mock_bundle))
        })
        .unwrap();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(slot.is_initialized());
    assert!(Arc::ptr_eq(&slot.get().unwrap(), &first));
}

#[rstest]
fn test_router_slot_failure_not_cached(mock_bundle: MockBundle) {
    let slot = RouterSlot::default();

    let failed = slot.get_or_try_init(|| -> UnifiedResult<CarbonAwareRouter> {
        Err(crate::ffi_error!("init_carbon_router", "models unavailable"))
    });
    assert!(matches!(failed, Err(UnifiedError::FFI { .. })));
    assert!(!slot.is_initialized());

    let router = slot.get_or_try_init(|| Ok(mock_router(&mock_bundle)));
    assert!(router.is_ok());
    assert!(slot.is_initialized());
}

#[rstest]
fn test_router_slot_retries_after_build_panic(mock_bundle: MockBundle) {
    let slot = RouterSlot::new();

    let panicked = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        slot.get_or_try_init(|| -> UnifiedResult<CarbonAwareRouter> {
            panic!("model load aborted")
        })
    }));
    assert!(panicked.is_err());
    assert!(!slot.is_initialized());

    let router = slot.get_or_try_init(|| Ok(mock_router(&mock_bundle)));
    assert!(router.is_ok());
    assert!(slot.is_initialized());
}

#[rstest]
fn test_router_slot_concurrent_initialization(mock_bundle: MockBundle) {
    let slot = RouterSlot::new();
    let builds = AtomicUsize::new(0);

    let routers: Vec<_> = (0..16)
        .into_par_iter()
        .map(|_| {
            slot.get_or_try_init(|| {
                builds.fetch_add(1, Ordering::SeqCst);
                Ok(mock_router(&mock_bundle))
            })
            .unwrap()
        })
        .collect();

    assert_eq!(builds.load(Ordering::SeqCst), 1);
    assert!(routers.iter().all(|r| Arc::ptr_eq(r, &routers[0])));
}

#[rstest]
fn test_config_from_null_path_uses_defaults() {
    let config = config_from_c_path(ptr::null()).unwrap();
    assert_eq!(config, CarbonRouterConfig::default());
}

#[rstest]
fn test_config_from_c_path_reads_yaml() {
    let file = create_temp_config_file("intensity:\n  kind: fixed\n  level: LOW\n").unwrap();
    let path = CString::new(file.path().to_string_lossy().to_string()).unwrap();

    let config = config_from_c_path(path.as_ptr()).unwrap();
    assert_eq!(
        config.intensity,
        crate::core::config_loader::IntensitySourceConfig::Fixed {
            level: IntensityLevel::Low
        }
    );
}

#[rstest]
fn test_config_from_c_path_errors() {
    let not_utf8 = CString::new(vec![0xffu8, 0xfe]).unwrap();
    assert!(matches!(
        config_from_c_path(not_utf8.as_ptr()),
        Err(UnifiedError::FFI { .. })
    ));

    let missing = CString::new("/nonexistent/carbon.yaml").unwrap();
    assert!(config_from_c_path(missing.as_ptr()).is_err());
}

#[rstest]
fn test_build_router_reports_load_failure(temp_dir: TempDir) {
    let err = build_router(&weightless_config(&temp_dir)).unwrap_err();
    assert!(err.is_load_failure());
}

#[rstest]
#[serial]
fn test_init_carbon_router_failure_leaves_router_unset(temp_dir: TempDir) {
    let path = temp_dir.path().to_string_lossy().to_string();
    let yaml = format!(
        "models:\n  full:\n    model_id: {p}\n  balanced:\n    model_id: {p}\n  \
         eco:\n    model_id: {p}\n",
        p = path
    );
    let file = create_temp_config_file(&yaml).unwrap();
    let config_path = CString::new(file.path().to_string_lossy().to_string()).unwrap();

    let was_initialized = is_carbon_router_initialized();
    let ok = init_carbon_router(config_path.as_ptr());

    if was_initialized {
        assert!(ok, "an initialized router must stay initialized");
    } else {
        assert!(!ok);
        assert!(!is_carbon_router_initialized());
    }
}

#[rstest]
#[serial]
fn test_init_carbon_router_bad_config_path() {
    let missing = CString::new("/nonexistent/carbon.yaml").unwrap();
    let ok = init_carbon_router(missing.as_ptr());
    assert_eq!(ok, is_carbon_router_initialized());
}

#[rstest]
#[serial]
fn test_carbon_aware_classify_requires_initialization() {
    let text = CString::new("hello").unwrap();
    let result = carbon_aware_classify(text.as_ptr());

    if is_carbon_router_initialized() {
        assert!(!result.error);
        crate::ffi::memory::free_carbon_inference_result(result);
    } else {
        assert!(result.error);
        assert!(result.sentiment_label.is_null());
    }
}
