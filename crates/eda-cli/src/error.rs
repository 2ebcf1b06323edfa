//! Custom error types for the EDA tool.
//!
//! Two layers: [`LoadError`] covers everything that can go wrong while turning a
//! delimited file into a [`Table`](crate::table::Table), and [`EdaError`] is the
//! crate-wide error every public operation returns.
//!
//! Errors are serializable as `{code, message}` so the `--json` output mode can
//! report failures in a machine-readable way.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// Failures of the tabular loader.
///
/// Every variant is a problem with the user's input, so the command adapter
/// reports all of them as a bad parameter.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The input path does not exist.
    #[error("File '{}' not found", .path.display())]
    FileNotFound { path: PathBuf },

    /// The requested text encoding is not a known label.
    #[error("Unsupported encoding '{label}'")]
    UnsupportedEncoding { label: String },

    /// The bytes are not valid in the requested encoding.
    #[error("File '{}' is not valid {encoding}", .path.display())]
    Decode { path: PathBuf, encoding: String },

    /// The delimited content is malformed.
    #[error("Failed to read CSV '{}': {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    /// Reading the file failed for another reason.
    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The main error type of the crate.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Invalid configuration or command option.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A table was built with unequal column lengths or duplicate names.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// A chart could not be drawn.
    #[error("Failed to render chart '{chart}': {reason}")]
    ChartRenderingFailed { chart: String, reason: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl From<ConfigValidationError> for EdaError {
    fn from(err: ConfigValidationError) -> Self {
        EdaError::InvalidConfig(err.to_string())
    }
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(LoadError::FileNotFound { .. }) => "FILE_NOT_FOUND",
            Self::Load(LoadError::UnsupportedEncoding { .. }) => "UNSUPPORTED_ENCODING",
            Self::Load(LoadError::Decode { .. }) => "DECODE_ERROR",
            Self::Load(LoadError::Parse { .. }) => "PARSE_ERROR",
            Self::Load(LoadError::Io { .. }) => "LOAD_IO_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidTable(_) => "INVALID_TABLE",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::ChartRenderingFailed { .. } => "CHART_RENDERING_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure was caused by a bad user-supplied parameter
    /// (unreadable input, unknown encoding, invalid option).
    pub fn is_bad_parameter(&self) -> bool {
        match self {
            Self::Load(_) | Self::InvalidConfig(_) => true,
            Self::WithContext { source, .. } => source.is_bad_parameter(),
            _ => false,
        }
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for EDA operations.
pub type Result<T> = std::result::Result<T, EdaError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = EdaError::from(LoadError::FileNotFound {
            path: PathBuf::from("missing.csv"),
        });
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
        assert_eq!(
            EdaError::InvalidConfig("x".to_string()).error_code(),
            "INVALID_CONFIG"
        );
    }

    #[test]
    fn test_load_errors_are_bad_parameters() {
        let err = EdaError::from(LoadError::Parse {
            path: PathBuf::from("data.csv"),
            reason: "ragged line".to_string(),
        });
        assert!(err.is_bad_parameter());
        assert!(err.to_string().contains("ragged line"));
        assert!(!EdaError::ReportGenerationFailed("disk".to_string()).is_bad_parameter());
    }

    #[test]
    fn test_error_serialization() {
        let error = EdaError::from(LoadError::UnsupportedEncoding {
            label: "klingon".to_string(),
        });
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("UNSUPPORTED_ENCODING"));
        assert!(json.contains("klingon"));
    }

    #[test]
    fn test_with_context() {
        let error = EdaError::from(LoadError::FileNotFound {
            path: PathBuf::from("a.csv"),
        })
        .with_context("While loading input");
        assert!(error.to_string().contains("While loading input"));
        assert_eq!(error.error_code(), "FILE_NOT_FOUND");
        assert!(error.is_bad_parameter());
    }
}
