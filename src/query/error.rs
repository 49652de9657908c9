//! Error types for the query evaluators.

use thiserror::Error;

/// Failure raised while evaluating a tabular or hierarchical query.
///
/// These never escape the tool boundary: [`render_outcome`] turns them into
/// the text the agent reads.
#[derive(Error, Debug)]
pub enum EvaluatorError {
    #[error("Error: File not found at path: {0}")]
    FileNotFound(String),

    #[error("Error: Column '{column}' not found. Available columns: {}", .available.join(", "))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
    },

    #[error("Error: Key '{key}' not found at '{path}'")]
    KeyNotFound { key: String, path: String },

    #[error("Error: Index {index} out of range at '{path}' (length {len})")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        path: String,
    },

    #[error("Error: {0} parameter required for '{1}' operation")]
    MissingParameter(&'static str, &'static str),

    #[error("Error: Unknown operation {operation}. Available operations: {available}")]
    UnknownOperation {
        operation: String,
        available: &'static str,
    },

    #[error("Error: expected {expected} at '{path}', found {found}")]
    ShapeMismatch {
        expected: &'static str,
        found: &'static str,
        path: String,
    },

    #[error("Error: Root element is not a dictionary")]
    NotAMapping,

    #[error("Error processing {source_kind}: {detail}")]
    ParseFailure {
        source_kind: &'static str,
        detail: String,
    },
}

impl EvaluatorError {
    pub(crate) fn parse(source_kind: &'static str, detail: impl std::fmt::Display) -> Self {
        Self::ParseFailure {
            source_kind,
            detail: detail.to_string(),
        }
    }
}

/// Result type for evaluator operations.
pub type EvalResult<T> = std::result::Result<T, EvaluatorError>;

/// Collapse an evaluator outcome into the text handed back to the caller.
pub fn render_outcome(outcome: EvalResult<String>) -> String {
    match outcome {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!("Evaluator returned error: {:?}", e);
            e.to_string()
        }
    }
}
