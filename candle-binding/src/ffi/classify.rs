//! FFI Classification Functions

use std::ffi::{c_char, CStr, CString};

use crate::core::unified_error::UnifiedResult;
use crate::ffi::init::CARBON_ROUTER;
use crate::ffi::types::CarbonInferenceResult;
use crate::ffi_error;
use crate::model_architectures::routing::{CarbonAwareRouter, InferenceResult};

fn text_from_c<'a>(text: *const c_char) -> UnifiedResult<&'a str> {
    if text.is_null() {
        return Err(ffi_error!("carbon_aware_classify", "text pointer is null"));
    }
    unsafe { CStr::from_ptr(text) }.to_str().map_err(|e| {
        ffi_error!(
            "carbon_aware_classify",
            format!("text is not valid UTF-8: {}", e)
        )
    })
}

fn to_c_string(value: &str) -> UnifiedResult<*mut c_char> {
    CString::new(value)
        .map(CString::into_raw)
        .map_err(|e| ffi_error!("carbon_aware_classify", e, "interior NUL byte"))
}

/// Convert a routed result into its C form; strings become caller-owned
pub fn inference_result_to_c(result: &InferenceResult) -> UnifiedResult<CarbonInferenceResult> {
    let model_used = to_c_string(&result.model_used)?;
    let sentiment_label = match to_c_string(&result.sentiment_label) {
        Ok(ptr) => ptr,
        Err(e) => {
            // Reclaim the first string before bailing out
            unsafe { drop(CString::from_raw(model_used)) };
            return Err(e);
        }
    };

    Ok(CarbonInferenceResult {
        model_used,
        sentiment_label,
        intensity_level: result.intensity_level.as_c_int(),
        gauge_percent: result.intensity_level.gauge_percent(),
        error: false,
    })
}

/// Route one C string through `router`
pub fn classify_with_router(
    router: &CarbonAwareRouter,
    text: *const c_char,
) -> CarbonInferenceResult {
    let outcome = text_from_c(text)
        .and_then(|text| router.infer(text))
        .and_then(|result| inference_result_to_c(&result));

    match outcome {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "carbon-aware classification failed");
            CarbonInferenceResult::error()
        }
    }
}

/// Classify text with the model chosen by the current carbon intensity
///
/// # Safety
/// - `text` must be a valid null-terminated C string or null
/// - the returned strings must be released with `free_carbon_inference_result`
#[no_mangle]
pub extern "C" fn carbon_aware_classify(text: *const c_char) -> CarbonInferenceResult {
    match CARBON_ROUTER.get() {
        Some(router) => classify_with_router(&router, text),
        None => {
            tracing::error!("carbon-aware router not initialized");
            CarbonInferenceResult::error()
        }
    }
}
