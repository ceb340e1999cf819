//! Error types for the evaluation pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Main error type for the benchmark pipeline
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(String),

    #[error("Feature selection error: {0}")]
    SelectionError(String),

    #[error("Resampling error: {0}")]
    ResamplingError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Insufficient training data: class {class} has {count} instances, need at least {folds} for {folds}-fold cross-validation")]
    InsufficientTrainingData {
        class: i64,
        count: usize,
        folds: usize,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },
}

impl EvalError {
    /// True for failures that abandon a single (partition, strategy) row
    /// rather than the whole run.
    pub fn is_row_recoverable(&self) -> bool {
        matches!(
            self,
            EvalError::SelectionError(_) | EvalError::ResamplingError(_)
        )
    }
}

impl From<polars::error::PolarsError> for EvalError {
    fn from(err: polars::error::PolarsError) -> Self {
        EvalError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for EvalError {
    fn from(err: serde_json::Error) -> Self {
        EvalError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvalError::ConfigError("missing event column".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing event column");
    }

    #[test]
    fn test_insufficient_data_message_names_class_and_folds() {
        let err = EvalError::InsufficientTrainingData {
            class: 1,
            count: 2,
            folds: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("class 1"));
        assert!(msg.contains("10-fold"));
    }

    #[test]
    fn test_row_recoverable_partition() {
        assert!(EvalError::SelectionError("x".into()).is_row_recoverable());
        assert!(EvalError::ResamplingError("x".into()).is_row_recoverable());
        assert!(!EvalError::InsufficientTrainingData {
            class: 0,
            count: 1,
            folds: 10
        }
        .is_row_recoverable());
        assert!(!EvalError::ConfigError("x".into()).is_row_recoverable());
    }
}
