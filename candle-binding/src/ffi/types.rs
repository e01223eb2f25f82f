//! FFI Type Definitions

use std::ffi::c_char;
use std::ptr;

/// Routed sentiment result returned to C callers.
///
/// `model_used` and `sentiment_label` are owned by the caller once returned
/// and must be released with `free_carbon_inference_result`.
#[repr(C)]
#[derive(Debug)]
pub struct CarbonInferenceResult {
    pub model_used: *mut c_char,
    pub sentiment_label: *mut c_char,
    /// 0 = LOW, 1 = MEDIUM, 2 = HIGH, -1 = error
    pub intensity_level: i32,
    /// Dashboard gauge reading (30 / 60 / 90), 0 on error
    pub gauge_percent: f32,
    pub error: bool,
}

impl CarbonInferenceResult {
    /// Result carrying no data and `error = true`
    pub fn error() -> Self {
        Self {
            model_used: ptr::null_mut(),
            sentiment_label: ptr::null_mut(),
            intensity_level: -1,
            gauge_percent: 0.0,
            error: true,
        }
    }
}

impl Default for CarbonInferenceResult {
    fn default() -> Self {
        Self::error()
    }
}
