//! Error types for the expander.
//!
//! This module defines a hierarchy of error types:
//!
//! - [`ExpandError`] - Contract violations of the expansion itself
//! - [`GridError`] - Loading columns from JSON or CSV input
//! - [`OutputError`] - Rendering a table as CSV or JSON
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Expansion Errors
// =============================================================================

/// Caller errors detected before any row is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpandError {
    /// Input is not a mapping of column name to a sequence of values.
    #[error("Invalid input type: expected {expected}, found {found}")]
    InvalidInputType { expected: String, found: String },

    /// Nested columns do not share one length.
    #[error("Nested columns must have equal lengths, got {}", format_lengths(.lengths))]
    NestingLengthMismatch { lengths: Vec<(String, usize)> },

    /// Nesting names a column that does not exist.
    #[error("Unknown nesting column: {0}")]
    UnknownNestingKey(String),

    /// Nesting names the same column twice.
    #[error("Duplicate nesting column: {0}")]
    DuplicateNestingKey(String),

    /// Two columns share a name.
    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),

    /// The number of rows does not fit in memory addressing.
    #[error("Row count overflows usize")]
    RowCountOverflow,
}

fn format_lengths(lengths: &[(String, usize)]) -> String {
    lengths
        .iter()
        .map(|(name, len)| format!("{}={}", name, len))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Grid Loading Errors
// =============================================================================

/// Errors while loading columns from a document.
#[derive(Debug, Error)]
pub enum GridError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed CSV.
    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to decode the input bytes.
    #[error("Failed to decode content: {0}")]
    Encoding(String),

    /// Empty input.
    #[error("Input is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Document shape violates the expansion contract.
    #[error(transparent)]
    Invalid(#[from] ExpandError),
}

// =============================================================================
// Output Errors
// =============================================================================

/// Errors while rendering a table.
#[derive(Debug, Error)]
pub enum OutputError {
    /// CSV writer error.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendered CSV is not valid UTF-8.
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by [`crate::transform::pipeline`].
/// It wraps all lower-level errors and adds pipeline-specific variants.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input loading error.
    #[error("Input error: {0}")]
    Grid(#[from] GridError),

    /// Expansion contract violation.
    #[error("Expansion error: {0}")]
    Expand(#[from] ExpandError),

    /// Rendering error.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// Request document failed schema validation.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Expansion would produce more rows than allowed.
    #[error("Expansion would produce {rows} rows, limit is {limit}")]
    RowLimitExceeded { rows: usize, limit: usize },
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for expansion operations.
pub type ExpandResult<T> = Result<T, ExpandError>;

/// Result type for input loading.
pub type GridResult<T> = Result<T, GridError>;

/// Result type for rendering.
pub type OutputResult<T> = Result<T, OutputError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // ExpandError -> GridError -> PipelineError
        let expand_err = ExpandError::UnknownNestingKey("model".into());
        let grid_err: GridError = expand_err.into();
        let pipeline_err: PipelineError = grid_err.into();
        assert!(pipeline_err.to_string().contains("model"));

        // ExpandError -> PipelineError
        let pipeline_err: PipelineError = ExpandError::RowCountOverflow.into();
        assert!(pipeline_err.to_string().contains("overflows"));
    }

    #[test]
    fn test_length_mismatch_format() {
        let err = ExpandError::NestingLengthMismatch {
            lengths: vec![("make".into(), 2), ("model".into(), 3)],
        };
        let msg = err.to_string();
        assert!(msg.contains("make=2"));
        assert!(msg.contains("model=3"));
    }

    #[test]
    fn test_row_limit_format() {
        let err = PipelineError::RowLimitExceeded { rows: 12, limit: 10 };
        let msg = err.to_string();
        assert!(msg.contains("12"));
        assert!(msg.contains("10"));
    }
}
