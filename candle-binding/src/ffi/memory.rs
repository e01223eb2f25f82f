//! FFI Memory Management Functions

use crate::ffi::types::CarbonInferenceResult;
use std::ffi::{c_char, CString};

/// Free the strings owned by a routed inference result
///
/// # Safety
/// - `result` must come from `carbon_aware_classify` and not have been freed before
#[no_mangle]
pub extern "C" fn free_carbon_inference_result(result: CarbonInferenceResult) {
    free_cstring(result.model_used);
    free_cstring(result.sentiment_label);
}

/// Free C string
///
/// # Safety
/// - `s` must be a valid pointer allocated by this library, or null
#[no_mangle]
pub extern "C" fn free_cstring(s: *mut c_char) {
    unsafe {
        if !s.is_null() {
            let _ = CString::from_raw(s);
        }
    }
}
