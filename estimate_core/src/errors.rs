//! # Error Types
//!
//! Structured error types for estimate_core. Arithmetic paths never return
//! these (they degrade to zero instead); errors are reserved for the
//! boundaries with external collaborators and for configuration loading.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::errors::{EstimateError, CalcResult};
//!
//! fn validate_height(height_ft: f64) -> CalcResult<()> {
//!     if height_ft <= 0.0 {
//!         return Err(EstimateError::invalid_input(
//!             "height_ft",
//!             height_ft.to_string(),
//!             "Wall height must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for estimate_core operations
pub type CalcResult<T> = Result<T, EstimateError>;

/// Structured error type for estimation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum EstimateError {
    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// The composition detector returned NaN, negative, out-of-range or
    /// all-zero percentages
    #[error("Invalid composition data: {reason}")]
    InvalidCompositionData { reason: String },

    /// The composition detector call itself failed
    #[error("Composition detection failed: {reason}")]
    DetectionFailed { reason: String },

    /// A structural role has no catalog candidate
    #[error("No catalog material available for role: {role}")]
    MissingMaterial { role: String },

    /// A referenced material id is not in the current catalog snapshot
    #[error("Material not found: {material_id}")]
    MaterialNotFound { material_id: String },

    /// A dimension string could not be parsed into L x W x H
    #[error("Malformed dimensions '{raw}': {reason}")]
    MalformedDimensions { raw: String, reason: String },

    /// The perspective generator failed
    #[error("Perspective generation failed: {reason}")]
    PerspectiveGenerationFailed { reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl EstimateError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidCompositionData error
    pub fn invalid_composition(reason: impl Into<String>) -> Self {
        EstimateError::InvalidCompositionData {
            reason: reason.into(),
        }
    }

    /// Create a DetectionFailed error
    pub fn detection_failed(reason: impl Into<String>) -> Self {
        EstimateError::DetectionFailed {
            reason: reason.into(),
        }
    }

    /// Create a MissingMaterial error
    pub fn missing_material(role: impl Into<String>) -> Self {
        EstimateError::MissingMaterial { role: role.into() }
    }

    /// Create a MaterialNotFound error
    pub fn material_not_found(material_id: impl Into<String>) -> Self {
        EstimateError::MaterialNotFound {
            material_id: material_id.into(),
        }
    }

    /// Create a MalformedDimensions error
    pub fn malformed_dimensions(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::MalformedDimensions {
            raw: raw.into(),
            reason: reason.into(),
        }
    }

    /// Create a PerspectiveGenerationFailed error
    pub fn perspective_failed(reason: impl Into<String>) -> Self {
        EstimateError::PerspectiveGenerationFailed {
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimateError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Check if this is a recoverable error the user may retry.
    ///
    /// Detector failures are surfaced for a manual retry; nothing in the
    /// engine retries automatically.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EstimateError::InvalidCompositionData { .. }
                | EstimateError::DetectionFailed { .. }
                | EstimateError::PerspectiveGenerationFailed { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            EstimateError::InvalidInput { .. } => "INVALID_INPUT",
            EstimateError::InvalidCompositionData { .. } => "INVALID_COMPOSITION_DATA",
            EstimateError::DetectionFailed { .. } => "DETECTION_FAILED",
            EstimateError::MissingMaterial { .. } => "MISSING_MATERIAL",
            EstimateError::MaterialNotFound { .. } => "MATERIAL_NOT_FOUND",
            EstimateError::MalformedDimensions { .. } => "MALFORMED_DIMENSIONS",
            EstimateError::PerspectiveGenerationFailed { .. } => "PERSPECTIVE_GENERATION_FAILED",
            EstimateError::FileError { .. } => "FILE_ERROR",
            EstimateError::SerializationError { .. } => "SERIALIZATION_ERROR",
            EstimateError::VersionMismatch { .. } => "VERSION_MISMATCH",
            EstimateError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = EstimateError::invalid_composition("loadBearingPercentage is NaN");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("InvalidCompositionData"));
        let roundtrip: EstimateError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(EstimateError::missing_material("Cement").error_code(), "MISSING_MATERIAL");
        assert_eq!(EstimateError::material_not_found("b-1").error_code(), "MATERIAL_NOT_FOUND");
        assert_eq!(EstimateError::detection_failed("timeout").error_code(), "DETECTION_FAILED");
    }

    #[test]
    fn test_detector_failures_are_recoverable() {
        assert!(EstimateError::invalid_composition("sum is zero").is_recoverable());
        assert!(EstimateError::detection_failed("timeout").is_recoverable());
        assert!(!EstimateError::material_not_found("b-1").is_recoverable());
    }
}
