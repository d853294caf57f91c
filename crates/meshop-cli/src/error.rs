//! CLI error types with exit code handling
//!
//! This module provides a unified error type for CLI operations that
//! maps errors to appropriate exit codes.

use meshop_core::CoreError;
use meshop_translate::TranslateError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Values file or configuration could not be parsed
    #[error("Invalid input: {message}")]
    #[diagnostic(code(meshop::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The values document could not be translated
    #[error("Translation failed: {message}")]
    #[diagnostic(code(meshop::cli::translate))]
    Translation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// No mapping table for the requested version
    #[error("{message}")]
    #[diagnostic(
        code(meshop::cli::unsupported_version),
        help("run `meshop versions` to list the supported versions")
    )]
    UnsupportedVersion { message: String },

    /// Invalid combination of arguments
    #[error("{message}")]
    #[diagnostic(code(meshop::cli::usage))]
    Usage { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(meshop::cli::io))]
    Io { message: String },

    /// Internal error (mapping table defect, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(meshop::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Translation { .. } => exit_codes::TRANSLATION_ERROR,
            CliError::UnsupportedVersion { .. } => exit_codes::UNSUPPORTED_VERSION,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Io(e) => CliError::from(e),
            CoreError::InvalidVersion { .. } => CliError::usage(err.to_string()),
            CoreError::InvalidPath { .. } | CoreError::PathConflict { .. } => {
                CliError::internal(err.to_string())
            }
            other => CliError::input_with_help(
                other.to_string(),
                "the values file must be a YAML mapping",
            ),
        }
    }
}

impl From<TranslateError> for CliError {
    fn from(err: TranslateError) -> Self {
        if err.is_mapping_defect() {
            return CliError::internal(err.to_string());
        }
        match err {
            TranslateError::UnsupportedVersion { .. } => CliError::UnsupportedVersion {
                message: err.to_string(),
            },
            TranslateError::Core(core) => CliError::from(core),
            TranslateError::InvalidRange { .. } => CliError::Translation {
                message: err.to_string(),
                help: Some("autoscaleMin must not exceed autoscaleMax".to_string()),
            },
            other => CliError::Translation {
                message: other.to_string(),
                help: None,
            },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::input_with_help("x", "y").exit_code(), exit_codes::INPUT_ERROR);
        assert_eq!(CliError::usage("x").exit_code(), exit_codes::USAGE_ERROR);
        assert_eq!(CliError::internal("x").exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_translate_error_mapping() {
        let err = CliError::from(TranslateError::UnsupportedVersion {
            version: "1.1".into(),
            supported: "1.3, 1.4".into(),
        });
        assert_eq!(err.exit_code(), exit_codes::UNSUPPORTED_VERSION);

        let err = CliError::from(TranslateError::InvalidRange {
            path: "pilot".into(),
            min: 5,
            max: 2,
        });
        assert_eq!(err.exit_code(), exit_codes::TRANSLATION_ERROR);

        let err = CliError::from(TranslateError::OverlappingRules {
            first: "a".into(),
            second: "b".into(),
        });
        assert_eq!(err.exit_code(), exit_codes::ERROR);
    }

    #[test]
    fn test_core_io_maps_to_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = CliError::from(TranslateError::Core(CoreError::Io(io)));
        assert_eq!(err.exit_code(), exit_codes::IO_ERROR);
    }
}
