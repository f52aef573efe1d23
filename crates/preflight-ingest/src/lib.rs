//! Tabular import collaborators for the preflight checks.
//!
//! Everything here runs before validation starts: locating workbooks,
//! reading sheets into [`Dataset`]s, extracting row-major tables from
//! semi-structured sheets, and loading the project description that says
//! which columns each table must have.

pub mod dataset;
pub mod error;
pub mod frame;
pub mod project;
pub mod row_major;
pub mod table;
pub mod workbook;

pub use dataset::{Dataset, column_values};
pub use error::{IngestError, Result};
pub use frame::{ImportOptions, frame_from_grid, frame_from_rows, mangle_duplicate_headers};
pub use project::{ProjectSpec, RangeCheckSpec, RegexCheckSpec, SessionSpec, TableSpec};
pub use row_major::{BLANK_FLAG, RowMajorParse, RowMajorTable};
pub use table::{Table, TableMetadata};
pub use workbook::{CsvWorkbook, CsvWorkbookSource, RawGrid, Workbook, WorkbookSource, read_grid};
