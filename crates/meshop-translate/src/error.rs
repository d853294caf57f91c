//! Translation error types

use meshop_core::CoreError;
use thiserror::Error;

/// Translator error
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Unsupported version {version}: no mapping table registered (supported: {supported})")]
    UnsupportedVersion { version: String, supported: String },

    #[error("Mapping rules '{first}' and '{second}' write overlapping destination paths")]
    OverlappingRules { first: String, second: String },

    #[error("Invalid range at '{path}': minimum {min} exceeds maximum {max}")]
    InvalidRange { path: String, min: u64, max: u64 },

    #[error("Invalid value at '{path}': expected {expected}, found {found}")]
    InvalidValue {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("Translated document does not fit the control plane spec schema: {message}")]
    Schema { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl TranslateError {
    /// Returns true for errors caused by a defective mapping table rather than
    /// by the input document. These are never worth retrying.
    pub fn is_mapping_defect(&self) -> bool {
        matches!(
            self,
            Self::OverlappingRules { .. }
                | Self::Core(CoreError::PathConflict { .. })
                | Self::Core(CoreError::InvalidPath { .. })
        )
    }

    pub(crate) fn invalid_value(
        path: impl ToString,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            path: path.to_string(),
            expected,
            found: found.into(),
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslateError>;
