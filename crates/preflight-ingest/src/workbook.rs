//! Workbooks made of CSV sheets.
//!
//! A workbook is either a single `.csv` file, holding one sheet named by the
//! file stem, or a directory whose `<sheet>.csv` files are its sheets. Sheets
//! are read as raw string grids with no header interpretation so that both
//! header-first imports and row-major parsing can work from the same cells.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{IngestError, Result};

/// Sheet cells in row order; rows may have different lengths.
pub type RawGrid = Vec<Vec<String>>;

/// An opened workbook.
pub trait Workbook {
    /// Path the workbook was opened from.
    fn path(&self) -> &Path;

    /// Names of every sheet in the workbook.
    fn sheet_names(&self) -> BTreeSet<String>;

    /// Read one sheet as raw cells.
    fn read_sheet(&self, sheet: &str) -> Result<RawGrid>;

    fn has_sheet(&self, sheet: &str) -> bool {
        self.sheet_names().contains(sheet)
    }
}

/// Opens workbooks from paths.
///
/// File checks go through this trait so they can run against something other
/// than the local filesystem.
pub trait WorkbookSource {
    type Book: Workbook;

    fn file_exists(&self, path: &Path) -> bool;

    fn open_workbook(&self, path: &Path) -> Result<Self::Book>;
}

/// Workbook backed by CSV files on disk.
#[derive(Debug, Clone)]
pub struct CsvWorkbook {
    path: PathBuf,
    sheets: BTreeMap<String, PathBuf>,
}

impl CsvWorkbook {
    /// Open a `.csv` file or a directory of `.csv` files.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut sheets = BTreeMap::new();
        if path.is_file() {
            if is_csv(path) {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    sheets.insert(stem.to_string(), path.to_path_buf());
                }
            }
        } else if path.is_dir() {
            let entries = std::fs::read_dir(path).map_err(|e| IngestError::read(path, e))?;
            for entry in entries {
                let entry = entry.map_err(|e| IngestError::read(path, e))?;
                let sheet_path = entry.path();
                if !sheet_path.is_file() || !is_csv(&sheet_path) {
                    continue;
                }
                if let Some(stem) = sheet_path.file_stem().and_then(|stem| stem.to_str()) {
                    sheets.insert(stem.to_string(), sheet_path.clone());
                }
            }
        }

        if sheets.is_empty() {
            return Err(IngestError::NotAWorkbook {
                path: path.to_path_buf(),
            });
        }
        debug!(path = %path.display(), sheets = sheets.len(), "opened workbook");
        Ok(Self {
            path: path.to_path_buf(),
            sheets,
        })
    }
}

impl Workbook for CsvWorkbook {
    fn path(&self) -> &Path {
        &self.path
    }

    fn sheet_names(&self) -> BTreeSet<String> {
        self.sheets.keys().cloned().collect()
    }

    fn read_sheet(&self, sheet: &str) -> Result<RawGrid> {
        let sheet_path = self
            .sheets
            .get(sheet)
            .ok_or_else(|| IngestError::SheetNotFound {
                sheet: sheet.to_string(),
                path: self.path.clone(),
            })?;
        let file = std::fs::File::open(sheet_path).map_err(|e| IngestError::read(sheet_path, e))?;
        read_grid(file).map_err(|source| IngestError::CsvParse {
            path: sheet_path.clone(),
            source,
        })
    }
}

/// Opens [`CsvWorkbook`]s from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWorkbookSource;

impl WorkbookSource for CsvWorkbookSource {
    type Book = CsvWorkbook;

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn open_workbook(&self, path: &Path) -> Result<CsvWorkbook> {
        CsvWorkbook::open(path)
    }
}

/// Read CSV text into a grid, keeping blank rows.
pub fn read_grid<R: Read>(reader: R) -> std::result::Result<RawGrid, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(normalize_cell).collect());
    }
    Ok(grid)
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_grid_keeps_blank_rows() {
        let grid = read_grid("a,b\n,\n1, 2\n".as_bytes()).expect("grid");
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], vec!["", ""]);
        assert_eq!(grid[2], vec!["1", "2"]);
    }

    #[test]
    fn test_read_grid_ragged_rows() {
        let grid = read_grid("a\nb,c,d\n".as_bytes()).expect("grid");
        assert_eq!(grid[0].len(), 1);
        assert_eq!(grid[1].len(), 3);
    }

    #[test]
    fn test_is_csv() {
        assert!(is_csv(Path::new("data/tbl1.CSV")));
        assert!(!is_csv(Path::new("data/tbl1.xlsx")));
    }
}
