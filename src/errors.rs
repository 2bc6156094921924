//! Error handling for the crop water advisor
//!
//! Every failure in the pipeline is either fatal at startup (the model
//! artifact) or a guarded input violation (categories and numeric domains).
//! There is no retryable error class.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Main error type for the crop water advisor
#[derive(Error, Debug)]
pub enum CropWaterError {
    #[error("Model file not found: {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load model from {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unknown {category} value: '{value}'")]
    UnknownCategory { category: String, value: String },

    #[error("{field} = {value} is outside its domain [{min}, {max}]")]
    OutOfDomain {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Feature schema mismatch: model expects {expected} features, got {actual}")]
    FeatureSchema { expected: usize, actual: usize },

    #[error("Inference failed: {message}")]
    Inference { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Result with CropWaterError
pub type CropWaterResult<T> = Result<T, CropWaterError>;

impl CropWaterError {
    /// Create a model-not-found error
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound { path: path.into() }
    }

    /// Create a model load error
    pub fn model_load(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelLoad {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an error for a request body that does not parse
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an unknown category error
    pub fn unknown_category(category: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnknownCategory {
            category: category.into(),
            value: value.into(),
        }
    }

    /// Create an out-of-domain error
    pub fn out_of_domain(field: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfDomain {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Create a feature schema mismatch error
    pub fn feature_schema(expected: usize, actual: usize) -> Self {
        Self::FeatureSchema { expected, actual }
    }

    /// Create an inference error
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// True for errors caused by the caller's input rather than the service
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CropWaterError::InvalidInput { .. }
                | CropWaterError::UnknownCategory { .. }
                | CropWaterError::OutOfDomain { .. }
        )
    }
}

/// Convert from std::io errors
impl From<std::io::Error> for CropWaterError {
    fn from(err: std::io::Error) -> Self {
        CropWaterError::io("io_operation", err)
    }
}

/// Convert from figment errors
impl From<figment::Error> for CropWaterError {
    fn from(err: figment::Error) -> Self {
        CropWaterError::config(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}

impl IntoResponse for CropWaterError {
    fn into_response(self) -> Response {
        let status = match self {
            CropWaterError::InvalidInput { .. }
            | CropWaterError::UnknownCategory { .. }
            | CropWaterError::OutOfDomain { .. } => StatusCode::BAD_REQUEST,
            CropWaterError::ModelNotFound { .. }
            | CropWaterError::ModelLoad { .. }
            | CropWaterError::FeatureSchema { .. }
            | CropWaterError::Inference { .. }
            | CropWaterError::Config { .. }
            | CropWaterError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (
            status,
            Json(ErrBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = CropWaterError::model_not_found("models/missing.onnx");
        assert!(err.to_string().contains("Model file not found"));
        assert!(err.to_string().contains("models/missing.onnx"));

        let err = CropWaterError::unknown_category("soil_type", "Gravel");
        assert_eq!(err.to_string(), "Unknown soil_type value: 'Gravel'");
        assert!(err.is_input_error());

        let err = CropWaterError::out_of_domain("humidity", 120.0, 20.0, 100.0);
        assert!(err.to_string().contains("humidity = 120"));
        assert!(err.is_input_error());

        assert!(CropWaterError::invalid_input("expected f64").is_input_error());
        assert!(!CropWaterError::inference("nan").is_input_error());
    }

    #[test]
    fn test_error_chaining() {
        use std::error::Error;

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CropWaterError::io("reading model", io_err);

        assert!(err.source().is_some());
        assert!(err.to_string().contains("I/O operation failed"));
    }

    #[test]
    fn test_status_mapping() {
        let response = CropWaterError::unknown_category("crop_type", "Barley").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = CropWaterError::invalid_input("temperature: invalid type").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = CropWaterError::inference("model returned NaN").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
