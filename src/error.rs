//! Error types for the prerequisite parser

use thiserror::Error;

use crate::requisite::GrammarRejection;

/// Main error type for the prerequisite parser
#[derive(Error, Debug)]
pub enum RequisiteError {
    #[error("Input does not match grammar rules: {0}")]
    Rejected(#[from] GrammarRejection),

    #[error("Invalid N_OF count: {count} of {choices} choices")]
    InvalidCount { count: u64, choices: usize },

    #[error("Malformed parse tree: {0}")]
    MalformedTree(String),

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Backend reply error: {0}")]
    Backend(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Parse task failed: {0}")]
    TaskFailed(String),
}

#[cfg(feature = "python")]
impl From<RequisiteError> for pyo3::PyErr {
    fn from(err: RequisiteError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyValueError};

        match err {
            RequisiteError::TaskFailed(_) | RequisiteError::MalformedTree(_) => {
                PyRuntimeError::new_err(err.to_string())
            }
            other => PyValueError::new_err(other.to_string()),
        }
    }
}

/// Result type alias for the prerequisite parser
pub type Result<T> = std::result::Result<T, RequisiteError>;
