//! Error types for loading the order dataset and deriving the dashboard tables.
//!
//! Loading failures are fatal and surface before any aggregation runs.
//! Aggregation failures are rare and come from polars or from an RFM
//! reference date that precedes a purchase.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// A timestamp cell that could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot parse '{value}' in column '{column}' at row {row} as a timestamp")]
pub struct ParseError {
    /// Column holding the offending value
    pub column: String,
    /// Zero-based data row index
    pub row: usize,
    /// Raw text (empty when the cell was missing)
    pub value: String,
}

/// Errors that can occur while loading the order dataset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input file does not exist.
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Extension is neither `csv` nor `parquet`.
    #[error("Unsupported file format: {0}. Supported formats: csv, parquet")]
    UnsupportedFormat(String),

    /// One or more required columns are absent from the header.
    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A timestamp failed to parse under the strict policy.
    #[error(transparent)]
    Timestamp(#[from] ParseError),

    /// Unreadable or malformed file, or a column of the wrong type.
    #[error("Failed to read dataset: {0}")]
    Polars(#[from] PolarsError),
}

/// Errors that can occur while deriving the dashboard tables.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A customer purchased after the RFM reference instant.
    #[error(
        "Customer '{customer_id}' purchased at {purchased_at}, after the reference date {reference}"
    )]
    PurchaseAfterReference {
        customer_id: String,
        purchased_at: chrono::NaiveDateTime,
        reference: chrono::NaiveDateTime,
    },

    /// A polars expression failed to evaluate.
    #[error("Aggregation failed: {0}")]
    Polars(#[from] PolarsError),
}
