//! Error types for fairness-aware training.
//!
//! Configuration problems abort a run before any training happens. Numeric
//! degeneracies (empty group-class cells, empty class subsets) are not errors:
//! they are guarded where they occur and reported through `log::warn!`.

use std::path::Path;
use thiserror::Error;

use crate::config::ValidationError;

/// Result type alias for fairtrain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring or running a fairness trainer.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The strategy does not implement the requested fairness criterion.
    #[error("Unsupported fairness criterion '{criterion}' for method '{method}'\n  → Supported: {supported}")]
    UnsupportedCriterion {
        method: String,
        criterion: String,
        supported: String,
    },

    /// The strategy assumes a fixed number of sensitive groups.
    #[error("Method '{method}' requires exactly {expected} groups, dataset has {actual}")]
    GroupCount {
        method: String,
        expected: usize,
        actual: usize,
    },

    /// Dataset name is not in the dataset registry.
    #[error("Unsupported dataset: '{0}'\n  → Run `fairtrain methods` to list datasets")]
    UnknownDataset(String),

    /// Training method is not in the strategy registry.
    #[error("Unknown training method: '{0}'\n  → Run `fairtrain methods` to list methods")]
    UnknownMethod(String),

    /// Configuration value rejected by validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Dataset contract violation (out-of-range group/label, misaligned index).
    #[error("Invalid dataset: {0}")]
    Dataset(String),

    /// Array shape does not match the expected group-class layout.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// IO error with context.
    #[error("IO error: {context}\n  Cause: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error for a file path.
    pub fn io_path(action: &str, path: &Path, source: std::io::Error) -> Self {
        Self::io(format!("{action} {}", path.display()), source)
    }

    /// Whether this error is a configuration error that must abort the run.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::UnsupportedCriterion { .. }
                | Self::GroupCount { .. }
                | Self::UnknownDataset(_)
                | Self::UnknownMethod(_)
                | Self::Validation(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_classified() {
        assert!(Error::Config("x".into()).is_config_error());
        assert!(Error::UnknownDataset("celeba".into()).is_config_error());
        assert!(Error::GroupCount {
            method: "renyi".into(),
            expected: 2,
            actual: 4
        }
        .is_config_error());
        assert!(!Error::Dataset("bad".into()).is_config_error());
    }

    #[test]
    fn test_unsupported_criterion_message() {
        let err = Error::UnsupportedCriterion {
            method: "direct_reg".into(),
            criterion: "dp".into(),
            supported: "dca".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("direct_reg"));
        assert!(msg.contains("'dp'"));
        assert!(msg.contains("dca"));
    }

    #[test]
    fn test_io_error_context() {
        let err = Error::io(
            "reading config.yaml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("reading config.yaml"));
    }
}
