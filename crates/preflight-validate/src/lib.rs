//! Validation checks for imported tables and workbook files.
//!
//! Checks are boolean gates: they return `true` when the data passes and,
//! when it does not, record a coded message on the caller's
//! [`preflight_errors::ErrorSession`] before returning `false`. Errors
//! ([`CheckError`]) are reserved for misuse such as naming a column that
//! does not exist.
//!
//! ```
//! use std::sync::Arc;
//!
//! use polars::prelude::{DataFrame, NamedFrom, Series};
//! use preflight_errors::{ErrorCodeEntry, ErrorRegistry, ErrorSession};
//! use preflight_ingest::Dataset;
//! use preflight_validate::TableChecker;
//!
//! let registry = ErrorRegistry::load([
//!     ErrorCodeEntry::base(100, "Checks", "ContainsRequiredCols"),
//!     ErrorCodeEntry::message(101, "Checks", "ContainsRequiredCols", "Missing required column"),
//! ]);
//! let mut session = ErrorSession::new(Arc::new(registry)).with_print(false);
//! let frame = DataFrame::new(vec![Series::new("idx".into(), vec![1i64, 2]).into()]).unwrap();
//! let dataset = Dataset::new(frame);
//!
//! let required = vec!["idx".to_string(), "col_1".to_string()];
//! let mut checker = TableChecker::new(&dataset, &mut session);
//! assert!(!checker.contains_required_cols(Some(required.as_slice())));
//! assert_eq!(session.accumulated(), "Missing required column: col_1");
//! ```

pub mod check;
pub mod error;
pub mod file;
pub mod runner;
pub mod table;
mod util;

pub use check::Check;
pub use error::{CheckError, Result};
pub use file::{FILE_CHECK_LOCATION, FileChecker, FileRequirement};
pub use runner::{TableReport, check_table};
pub use table::TableChecker;
