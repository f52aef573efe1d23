//! Row-major tables embedded in free-form sheets.
//!
//! A sheet may carry a table that does not start at the first cell. Its
//! rows are located with two flags: the start flag marks a reference row,
//! the header and first data row sit at fixed offsets from it, and the end
//! flag (or the first empty cell when the flag is [`BLANK_FLAG`]) marks the
//! row after the last data row.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Dataset;
use crate::error::{IngestError, Result};
use crate::frame::{frame_from_rows, mangle_duplicate_headers};
use crate::table::Table;
use crate::workbook::RawGrid;

/// End flag meaning "the first empty cell in the end-bound column".
pub const BLANK_FLAG: &str = "<blank>";

/// Where to find a row-major table inside a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowMajorParse {
    pub flag_start_bound: String,
    pub icol_start_bound: usize,
    pub flag_end_bound: String,
    pub icol_end_bound: usize,
    /// Header row, counted from the start-flag row.
    pub iheader_rowoffset_from_flag: usize,
    /// First data row, counted from the start-flag row.
    pub idata_rowoffset_from_flag: usize,
}

/// Parsing state for one raw sheet.
#[derive(Debug, Clone)]
pub struct RowMajorTable {
    params: RowMajorParse,
    raw: RawGrid,
    table_name: String,
    idx_start_bound: Option<usize>,
    idx_end_bound: Option<usize>,
    idx_header_row: Option<usize>,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RowMajorTable {
    pub fn new(params: RowMajorParse, raw: RawGrid, table_name: impl Into<String>) -> Self {
        Self {
            params,
            raw,
            table_name: table_name.into(),
            idx_start_bound: None,
            idx_end_bound: None,
            idx_header_row: None,
            header: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn params(&self) -> &RowMajorParse {
        &self.params
    }

    pub fn idx_start_bound(&self) -> Option<usize> {
        self.idx_start_bound
    }

    pub fn idx_end_bound(&self) -> Option<usize> {
        self.idx_end_bound
    }

    pub fn idx_header_row(&self) -> Option<usize> {
        self.idx_header_row
    }

    /// Current header, raw or renamed depending on the steps run so far.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Run every step and store the result in `table`, indexed by its
    /// default index column.
    pub fn parse_into(&mut self, table: &mut Table) -> Result<()> {
        let frame = self.parse(&table.import_col_map)?;
        let mut dataset = Dataset::new(frame);
        if let Some(index_col) = &table.index_col {
            dataset
                .set_index(index_col)
                .map_err(|_| self.column_not_found(index_col))?;
        }
        table.set_dataset(dataset);
        Ok(())
    }

    /// Run every step and return the parsed frame.
    pub fn parse(&mut self, import_col_map: &[(String, String)]) -> Result<DataFrame> {
        self.find_start_bound()?;
        self.find_end_bound()?;
        self.read_header()?;
        self.subset_data_rows()?;
        self.subset_cols(import_col_map)?;
        self.rename_cols(import_col_map);
        let frame = frame_from_rows(&self.header, &self.rows)?;
        debug!(
            table = %self.table_name,
            rows = frame.height(),
            columns = frame.width(),
            "parsed row-major table"
        );
        Ok(frame)
    }

    /// First row whose start-bound cell equals the start flag.
    pub fn find_start_bound(&mut self) -> Result<usize> {
        let flag = &self.params.flag_start_bound;
        let icol = self.params.icol_start_bound;
        let found = self
            .raw
            .iter()
            .position(|row| cell(row, icol) == flag)
            .ok_or_else(|| IngestError::FlagNotFound {
                flag: flag.clone(),
                column: icol,
                table: self.table_name.clone(),
            })?;
        self.idx_start_bound = Some(found);
        Ok(found)
    }

    /// Row after the last data row.
    ///
    /// The search starts at the first data row. When the flag never appears
    /// the table runs to the end of the sheet.
    pub fn find_end_bound(&mut self) -> Result<usize> {
        let data_start = self.data_start()?;
        let flag = self.params.flag_end_bound.as_str();
        let icol = self.params.icol_end_bound;
        let found = self
            .raw
            .iter()
            .enumerate()
            .skip(data_start)
            .find(|(_, row)| {
                let value = cell(row, icol);
                if flag == BLANK_FLAG {
                    value.is_empty()
                } else {
                    value == flag
                }
            })
            .map_or(self.raw.len(), |(idx, _)| idx);
        self.idx_end_bound = Some(found);
        Ok(found)
    }

    /// Read the header row at its offset from the start flag.
    pub fn read_header(&mut self) -> Result<&[String]> {
        let start = self.start_bound()?;
        let idx_header_row = start + self.params.iheader_rowoffset_from_flag;
        let row = self
            .raw
            .get(idx_header_row)
            .ok_or_else(|| self.row_out_of_range(idx_header_row))?;
        let named: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                if value.is_empty() {
                    format!("Unnamed: {idx}")
                } else {
                    value.clone()
                }
            })
            .collect();
        self.header = mangle_duplicate_headers(&named);
        self.idx_header_row = Some(idx_header_row);
        Ok(self.header.as_slice())
    }

    /// Keep the rows between the first data row and the end bound.
    pub fn subset_data_rows(&mut self) -> Result<()> {
        let data_start = self.data_start()?;
        let end = self.idx_end_bound.unwrap_or(self.raw.len());
        if data_start > self.raw.len() {
            return Err(self.row_out_of_range(data_start));
        }
        let width = self.header.len();
        self.rows = self.raw[data_start..end.max(data_start)]
            .iter()
            .map(|row| {
                (0..width)
                    .map(|idx| cell(row, idx).to_string())
                    .collect()
            })
            .collect();
        Ok(())
    }

    /// Keep the columns named by the map's raw headers, in map order.
    ///
    /// An empty map keeps every column.
    pub fn subset_cols(&mut self, import_col_map: &[(String, String)]) -> Result<()> {
        if import_col_map.is_empty() {
            return Ok(());
        }
        let positions = import_col_map
            .iter()
            .map(|(raw, _)| {
                self.header
                    .iter()
                    .position(|name| name == raw)
                    .ok_or_else(|| self.column_not_found(raw))
            })
            .collect::<Result<Vec<usize>>>()?;
        self.header = positions.iter().map(|&idx| self.header[idx].clone()).collect();
        self.rows = self
            .rows
            .iter()
            .map(|row| positions.iter().map(|&idx| row[idx].clone()).collect())
            .collect();
        Ok(())
    }

    /// Rename raw headers to their mapped names.
    pub fn rename_cols(&mut self, import_col_map: &[(String, String)]) {
        for name in &mut self.header {
            if let Some((_, renamed)) = import_col_map.iter().find(|(raw, _)| raw == name) {
                name.clone_from(renamed);
            }
        }
    }

    fn start_bound(&self) -> Result<usize> {
        self.idx_start_bound.ok_or_else(|| IngestError::FlagNotFound {
            flag: self.params.flag_start_bound.clone(),
            column: self.params.icol_start_bound,
            table: self.table_name.clone(),
        })
    }

    fn data_start(&self) -> Result<usize> {
        Ok(self.start_bound()? + self.params.idata_rowoffset_from_flag)
    }

    fn row_out_of_range(&self, row: usize) -> IngestError {
        IngestError::RowOutOfRange {
            row,
            rows: self.raw.len(),
            table: self.table_name.clone(),
        }
    }

    fn column_not_found(&self, column: &str) -> IngestError {
        IngestError::ColumnNotFound {
            column: column.to_string(),
            table: self.table_name.clone(),
        }
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map_or("", String::as_str)
}
