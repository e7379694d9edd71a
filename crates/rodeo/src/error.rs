//! Error types for the Rodeo library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Rodeo operations.
#[derive(Debug, Error)]
pub enum RodeoError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A file could not be turned into a schema (unreadable, no header or data row).
    #[error("Extraction error for '{path}': {message}")]
    Extraction { path: PathBuf, message: String },

    /// A value could not be classified.
    ///
    /// The classifier falls back to `string` for anything it does not
    /// recognize, so this is never produced by [`crate::classify`].
    #[error("Inference error for value '{value}': {message}")]
    Inference { value: String, message: String },

    /// An analyzer invocation failed or timed out.
    #[error("Prediction error in {predictor}: {message}")]
    Prediction { predictor: String, message: String },

    /// No schema generator handles the file's extension.
    #[error("No schema generator for '{0}'")]
    NoGenerator(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Annotation cache could not be read or written.
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RodeoError {
    /// Build a prediction error for the named predictor.
    pub fn prediction(predictor: impl Into<String>, message: impl Into<String>) -> Self {
        RodeoError::Prediction {
            predictor: predictor.into(),
            message: message.into(),
        }
    }

    /// Build an extraction error for a path.
    pub fn extraction(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        RodeoError::Extraction {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error only concerns a single file.
    ///
    /// File-scoped errors are reported and skipped; the catalog run continues.
    pub fn is_file_scoped(&self) -> bool {
        matches!(
            self,
            RodeoError::Io { .. }
                | RodeoError::Csv(_)
                | RodeoError::Extraction { .. }
                | RodeoError::Inference { .. }
                | RodeoError::Prediction { .. }
                | RodeoError::NoGenerator(_)
        )
    }
}

/// Result type alias for Rodeo operations.
pub type Result<T> = std::result::Result<T, RodeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_scoped() {
        assert!(RodeoError::NoGenerator(PathBuf::from("a.txt")).is_file_scoped());
        assert!(RodeoError::extraction("a.csv", "no data rows").is_file_scoped());
        assert!(!RodeoError::Config("bad root".to_string()).is_file_scoped());
        assert!(!RodeoError::Cache("locked".to_string()).is_file_scoped());
    }

    #[test]
    fn test_display() {
        let err = RodeoError::prediction("sentiment", "timed out");
        assert_eq!(err.to_string(), "Prediction error in sentiment: timed out");
    }
}
