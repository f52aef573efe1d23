//! Error types for the check library.
//!
//! Data that fails a check is not an error: checks return `false` and record
//! a message. These errors cover misuse, such as naming a column the dataset
//! does not have.

use preflight_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckError {
    /// Column referenced by a check is absent from the dataset.
    #[error("column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Pattern passed to a regex check failed to compile.
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No row holds the lookup value.
    #[error("no row with {column} = '{value}'")]
    LookupRowNotFound { column: String, value: String },

    /// Table was checked before it was imported.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result type for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CheckError::LookupRowNotFound {
            column: "idx".to_string(),
            value: "7".to_string(),
        };
        assert_eq!(err.to_string(), "no row with idx = '7'");
    }
}
