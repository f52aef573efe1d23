//! Error types for loading the error-code table.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading an error-code table.
#[derive(Debug, Error)]
pub enum CodeTableError {
    /// Code table file could not be opened.
    #[error("failed to read error code table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reader failure (malformed quoting, bad UTF-8, ...).
    #[error("failed to parse error code table: {0}")]
    Csv(#[from] csv::Error),

    /// Required header missing from the table.
    #[error("required column '{column}' not found in error code table")]
    MissingColumn { column: String },

    /// `iCode` value that is not an integer.
    #[error("invalid iCode '{value}' on line {line}")]
    InvalidCode { value: String, line: u64 },
}

/// Result type for code table operations.
pub type Result<T> = std::result::Result<T, CodeTableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodeTableError::InvalidCode {
            value: "abc".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "invalid iCode 'abc' on line 3");

        let err = CodeTableError::MissingColumn {
            column: "Locn".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "required column 'Locn' not found in error code table"
        );
    }
}
