//! Error types for the comfortviz transformation pipeline.
//!
//! This module defines a hierarchy of error types following best practices:
//!
//! - [`SourceError`] - Data source (file fetch) errors
//! - [`ParseError`] - CSV parsing errors
//! - [`NormalizeError`] - Row normalization errors
//! - [`QueryError`] - Chart query validation errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Per-row problems (a malformed value, an unknown day name) are NOT
//! errors: those rows are dropped and counted in the normalizer's
//! drop statistics. Only whole-source failures surface here.

use thiserror::Error;

// =============================================================================
// Data Source Errors
// =============================================================================

/// Errors while fetching a tabular data file for a chart selection.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file for the given selection does not exist.
    #[error("No data file for selection: {0}")]
    NotFound(String),

    /// The file exists but contains no data rows.
    #[error("Data file is empty: {0}")]
    Empty(String),

    /// The fetch exceeded the configured time bound.
    #[error("Fetch timed out after {0} ms")]
    Timeout(u64),

    /// Underlying IO failure.
    #[error("Failed to read data file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// CSV Parsing Errors
// =============================================================================

/// Errors during CSV parsing.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read input.
    #[error("Failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode the detected encoding.
    #[error("Failed to decode content as {0}")]
    Encoding(String),

    /// Invalid CSV structure.
    #[error("Invalid CSV format: {0}")]
    Malformed(#[from] csv::Error),

    /// Empty input.
    #[error("CSV input is empty")]
    EmptyInput,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

// =============================================================================
// Normalization Errors
// =============================================================================

/// Errors during row normalization.
///
/// Individual malformed rows are dropped silently and counted; these
/// variants cover the degenerate cases where no usable output exists.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The input row sequence was empty.
    #[error("No rows to normalize")]
    EmptyInput,

    /// A column required by the chart family is absent from the headers.
    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    /// Every row was dropped as malformed.
    #[error("All {total} rows were dropped as malformed")]
    AllRowsDropped { total: usize },
}

// =============================================================================
// Query Errors
// =============================================================================

/// Errors validating a chart query against the known selection domains.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Zone id outside the monitored set.
    #[error("Unknown zone: {0}")]
    UnknownZone(u32),

    /// Floor level outside the monitored set.
    #[error("Unknown floor: {0}")]
    UnknownFloor(u32),

    /// Time range not supported by the requested chart kind.
    #[error("Time range '{range}' is not valid for {chart}")]
    UnsupportedTimeRange { chart: String, range: String },

    /// Entity kind does not match the chart kind (e.g. a floor for a
    /// zone-addressed chart).
    #[error("{chart} expects a {expected} entity")]
    EntityMismatch {
        chart: String,
        expected: &'static str,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the main error type returned by the fetch-and-transform
/// entry points. It wraps all lower-level errors; a chart failure is
/// isolated to that chart and never propagated to siblings.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Data source error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// CSV parsing error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Normalization error.
    #[error("Normalize error: {0}")]
    Normalize(#[from] NormalizeError),

    /// Query validation error.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

impl PipelineError {
    /// Whether this failure should render as a "no data" message
    /// rather than an error banner.
    ///
    /// A missing or empty file and the all-rows-dropped degenerate
    /// case are equivalent from the user's point of view: there is
    /// nothing to plot for the current selection.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            PipelineError::Source(SourceError::NotFound(_))
                | PipelineError::Source(SourceError::Empty(_))
                | PipelineError::Parse(ParseError::EmptyInput)
                | PipelineError::Normalize(NormalizeError::EmptyInput)
                | PipelineError::Normalize(NormalizeError::AllRowsDropped { .. })
        )
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for parse operations.
pub type ParseOutcome<T> = Result<T, ParseError>;

/// Result type for normalization operations.
pub type NormalizeOutcome<T> = Result<T, NormalizeError>;

/// Result type for pipeline operations.
pub type PipelineOutcome<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // SourceError -> PipelineError
        let src_err = SourceError::NotFound("zone26".into());
        let pipeline_err: PipelineError = src_err.into();
        assert!(pipeline_err.to_string().contains("zone26"));

        // NormalizeError -> PipelineError
        let norm_err = NormalizeError::MissingColumn("hour".into());
        let pipeline_err: PipelineError = norm_err.into();
        assert!(pipeline_err.to_string().contains("hour"));
    }

    #[test]
    fn test_no_data_classification() {
        let err: PipelineError = SourceError::NotFound("x".into()).into();
        assert!(err.is_no_data());

        let err: PipelineError = NormalizeError::AllRowsDropped { total: 4 }.into();
        assert!(err.is_no_data());

        let err: PipelineError = SourceError::Timeout(5000).into();
        assert!(!err.is_no_data());
    }

    #[test]
    fn test_all_rows_dropped_message() {
        let err = NormalizeError::AllRowsDropped { total: 10 };
        assert!(err.to_string().contains("10"));
    }
}
