//! Error types for tabular import.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while importing tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// File or directory not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file or directory.
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path exists but is not something a workbook can be opened from.
    #[error("not a valid workbook: {path}")]
    NotAWorkbook { path: PathBuf },

    /// Workbook has no sheet with the requested name.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    // === CSV Parsing Errors ===
    /// Failed to parse sheet CSV.
    #[error("failed to parse CSV {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    // === Table Errors ===
    /// Column referenced by import settings not found.
    #[error("column '{column}' not found in {table}")]
    ColumnNotFound { column: String, table: String },

    /// Row-major parse flag never found.
    #[error("flag '{flag}' not found in column {column} of {table}")]
    FlagNotFound {
        flag: String,
        column: usize,
        table: String,
    },

    /// Row offset points past the end of the sheet.
    #[error("row {row} out of range for {table} ({rows} rows)")]
    RowOutOfRange {
        row: usize,
        rows: usize,
        table: String,
    },

    /// Table was used before it was imported.
    #[error("table '{table}' has not been imported")]
    NotImported { table: String },

    // === Configuration Errors ===
    /// Project file failed to parse.
    #[error("failed to parse project file {path}: {source}")]
    Project {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::NotAWorkbook {
            path: PathBuf::from("/path/to/file.docx"),
        };
        assert_eq!(err.to_string(), "not a valid workbook: /path/to/file.docx");
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("test".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
