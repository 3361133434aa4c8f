//! Error types for event table ingestion.

use std::path::PathBuf;
use thiserror::Error;

use crate::schema::TableKind;

/// Errors that can occur while loading and normalizing input tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Input file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV with Polars.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    // === Schema Errors ===
    /// One or more required columns are absent.
    #[error("{table} table is missing required columns: {}", missing.join(", "))]
    Schema {
        table: TableKind,
        missing: Vec<String>,
    },

    /// A required cell is null or does not parse.
    #[error("invalid {column} value '{value}' in {table} table (row {row})")]
    InvalidValue {
        table: TableKind,
        column: String,
        row: usize,
        value: String,
    },

    // === Filter Errors ===
    /// None of the requested substances appear in the drug-use records.
    #[error("no drug-use records match any of the target substances: {}", targets.join(", "))]
    NoMatch { targets: Vec<String> },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
