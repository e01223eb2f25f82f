//! Unified Error Handling System
//!
//! One structured error type for configuration, model loading, inference,
//! intensity sampling and the C interface. Model internals keep working in
//! `anyhow::Result` and convert at the trait boundary through
//! [`ErrorUnification`].

use std::fmt;

use thiserror::Error;

/// Unified error type for all carbon-router operations
#[derive(Debug, Error)]
pub enum UnifiedError {
    /// Configuration-related errors (file loading, parsing, validation)
    #[error("Configuration error in '{operation}': {source}{}", fmt_context(.context))]
    Configuration {
        operation: String,
        source: ConfigErrorType,
        context: Option<String>,
    },

    /// Model-related errors (loading, initialization, inference)
    #[error("Model error ({model_type:?}) in '{operation}': {message}{}", fmt_context(.context))]
    Model {
        model_type: ModelErrorType,
        operation: String,
        message: String,
        context: Option<String>,
    },

    /// The intensity source produced a value outside LOW / MEDIUM / HIGH
    #[error("Unrecognized carbon intensity '{value}' from source '{source_name}'")]
    UnrecognizedIntensity { source_name: String, value: String },

    /// FFI-related errors (C interface, memory management)
    #[error("FFI error in '{function}': {reason}{}", fmt_safety(.safety_info))]
    FFI {
        function: String,
        reason: String,
        safety_info: Option<String>,
    },

    /// I/O errors (file operations, device access)
    #[error("I/O error in '{operation}': {source}{}", fmt_path(.path))]
    IO {
        operation: String,
        path: Option<String>,
        #[source]
        source: std::io::Error,
    },

    /// Validation errors (input validation, parameter checks)
    #[error(
        "Validation error for '{field}': expected '{expected}', got '{actual}'{}",
        fmt_context(.context)
    )]
    Validation {
        field: String,
        expected: String,
        actual: String,
        context: Option<String>,
    },
}

fn fmt_context(context: &Option<String>) -> String {
    context
        .as_ref()
        .map(|ctx| format!(" (context: {})", ctx))
        .unwrap_or_default()
}

fn fmt_safety(info: &Option<String>) -> String {
    info.as_ref()
        .map(|info| format!(" (safety: {})", info))
        .unwrap_or_default()
}

fn fmt_path(path: &Option<String>) -> String {
    path.as_ref()
        .map(|p| format!(" (path: {})", p))
        .unwrap_or_default()
}

/// Configuration error subtypes
#[derive(Debug, Error)]
pub enum ConfigErrorType {
    #[error("file not found: {0}")]
    FileNotFound(String),
    #[error("parse error: {0}")]
    ParseError(String),
    #[error("missing required field: {0}")]
    MissingField(String),
}

/// Model error subtypes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelErrorType {
    /// Full-precision BERT sentiment model
    Bert,
    /// Balanced DistilBERT sentiment model
    DistilBert,
    /// 8-bit quantized DistilBERT sentiment model
    QuantizedDistilBert,
    /// Registry-level failures not tied to one checkpoint
    Registry,
}

impl UnifiedError {
    /// True when the error came out of a model load (fatal at startup)
    pub fn is_load_failure(&self) -> bool {
        matches!(self, UnifiedError::Model { operation, .. } if operation == "model loading")
    }

    /// True when the error came out of a model invocation
    pub fn is_inference_failure(&self) -> bool {
        matches!(self, UnifiedError::Model { operation, .. } if operation == "model inference")
    }
}

/// Result type alias for unified error handling
pub type UnifiedResult<T> = Result<T, UnifiedError>;

/// Trait for converting errors with additional context
pub trait ErrorUnification<T> {
    fn with_model_context(
        self,
        model_type: ModelErrorType,
        operation: &str,
        context: Option<&str>,
    ) -> UnifiedResult<T>;
}

impl<T, E> ErrorUnification<T> for Result<T, E>
where
    E: fmt::Display,
{
    fn with_model_context(
        self,
        model_type: ModelErrorType,
        operation: &str,
        context: Option<&str>,
    ) -> UnifiedResult<T> {
        self.map_err(|e| UnifiedError::Model {
            model_type,
            operation: operation.to_string(),
            message: e.to_string(),
            context: context.map(|s| s.to_string()),
        })
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for UnifiedError {
    fn from(err: std::io::Error) -> Self {
        UnifiedError::IO {
            operation: "I/O operation".to_string(),
            path: None,
            source: err,
        }
    }
}

/// Convert from serde_json::Error
impl From<serde_json::Error> for UnifiedError {
    fn from(err: serde_json::Error) -> Self {
        UnifiedError::Configuration {
            operation: "JSON parsing".to_string(),
            source: ConfigErrorType::ParseError(err.to_string()),
            context: None,
        }
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for UnifiedError {
    fn from(err: serde_yaml::Error) -> Self {
        UnifiedError::Configuration {
            operation: "YAML parsing".to_string(),
            source: ConfigErrorType::ParseError(err.to_string()),
            context: None,
        }
    }
}

/// Create a model error
#[macro_export]
macro_rules! model_error {
    ($model_type:expr, $operation:expr, $msg:expr) => {
        $crate::core::unified_error::UnifiedError::Model {
            model_type: $model_type,
            operation: $operation.to_string(),
            message: $msg.to_string(),
            context: None,
        }
    };
    ($model_type:expr, $operation:expr, $msg:expr, $context:expr) => {
        $crate::core::unified_error::UnifiedError::Model {
            model_type: $model_type,
            operation: $operation.to_string(),
            message: $msg.to_string(),
            context: Some($context.to_string()),
        }
    };
}

/// Create an FFI error
#[macro_export]
macro_rules! ffi_error {
    ($function:expr, $msg:expr) => {
        $crate::core::unified_error::UnifiedError::FFI {
            function: $function.to_string(),
            reason: $msg.to_string(),
            safety_info: None,
        }
    };
    ($function:expr, $msg:expr, $safety:expr) => {
        $crate::core::unified_error::UnifiedError::FFI {
            function: $function.to_string(),
            reason: $msg.to_string(),
            safety_info: Some($safety.to_string()),
        }
    };
}

/// Configuration file loading errors
pub mod config_errors {
    use super::*;

    pub fn file_not_found(path: &str) -> UnifiedError {
        UnifiedError::Configuration {
            operation: "config file loading".to_string(),
            source: ConfigErrorType::FileNotFound(path.to_string()),
            context: None,
        }
    }

    pub fn missing_field(field: &str, file: &str) -> UnifiedError {
        UnifiedError::Configuration {
            operation: "config validation".to_string(),
            source: ConfigErrorType::MissingField(field.to_string()),
            context: Some(format!("in file: {}", file)),
        }
    }

    pub fn invalid_json(file: &str, error: &str) -> UnifiedError {
        UnifiedError::Configuration {
            operation: "JSON parsing".to_string(),
            source: ConfigErrorType::ParseError(error.to_string()),
            context: Some(format!("file: {}", file)),
        }
    }

    pub fn invalid_yaml(file: &str, error: &str) -> UnifiedError {
        UnifiedError::Configuration {
            operation: "YAML parsing".to_string(),
            source: ConfigErrorType::ParseError(error.to_string()),
            context: Some(format!("file: {}", file)),
        }
    }
}

/// Model operation errors
pub mod model_errors {
    use super::*;

    pub fn load_failure(model_type: ModelErrorType, path: &str, error: &str) -> UnifiedError {
        UnifiedError::Model {
            model_type,
            operation: "model loading".to_string(),
            message: error.to_string(),
            context: Some(format!("path: {}", path)),
        }
    }

    pub fn inference_failure(
        model_type: ModelErrorType,
        input_info: &str,
        error: &str,
    ) -> UnifiedError {
        UnifiedError::Model {
            model_type,
            operation: "model inference".to_string(),
            message: error.to_string(),
            context: Some(format!("input: {}", input_info)),
        }
    }
}

/// Intensity sampling errors
pub mod intensity_errors {
    use super::*;

    pub fn unrecognized(source_name: &str, value: impl fmt::Display) -> UnifiedError {
        UnifiedError::UnrecognizedIntensity {
            source_name: source_name.to_string(),
            value: value.to_string(),
        }
    }
}
