//! Project tables and their import settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{IngestError, Result};
use crate::frame::{ImportOptions, frame_from_grid};
use crate::workbook::{RawGrid, Workbook, WorkbookSource};

/// Column lists the batch checks default to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableMetadata {
    pub required_cols: Vec<String>,
    pub numeric_cols: Vec<String>,
    pub populated_cols: Vec<String>,
    pub nonblank_cols: Vec<String>,
}

/// A named data table: where it comes from and what it should contain.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub path: PathBuf,
    pub sheet: String,
    /// Column used as the row index by [`Table::reset_default_index`].
    pub index_col: Option<String>,
    /// Columns after this one are dropped on import.
    pub last_column: Option<String>,
    /// Raw header to final column name, in output order.
    pub import_col_map: Vec<(String, String)>,
    pub metadata: TableMetadata,
    dataset: Option<Dataset>,
}

impl Table {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        sheet: impl Into<String>,
        index_col: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            sheet: sheet.into(),
            index_col: index_col.map(str::to_string),
            last_column: None,
            import_col_map: Vec::new(),
            metadata: TableMetadata::default(),
            dataset: None,
        }
    }

    #[must_use]
    pub fn with_last_column(mut self, last_column: impl Into<String>) -> Self {
        self.last_column = Some(last_column.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: TableMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn with_import_col_map<I, K, V>(mut self, map: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.import_col_map = map
            .into_iter()
            .map(|(raw, name)| (raw.into(), name.into()))
            .collect();
        self
    }

    /// Read the table's sheet with its first row as the header.
    ///
    /// Blank header columns are dropped, as is everything after
    /// `last_column` when set. The imported dataset has a positional index.
    pub fn import<S: WorkbookSource>(&mut self, source: &S) -> Result<()> {
        let grid = self.read_raw(source)?;
        let options = ImportOptions {
            drop_blank_columns: true,
            last_column: self.last_column.clone(),
        };
        let frame = frame_from_grid(&grid, &options, &self.name)?;
        info!(
            table = %self.name,
            rows = frame.height(),
            columns = frame.width(),
            "imported table"
        );
        self.dataset = Some(Dataset::new(frame));
        Ok(())
    }

    /// Read the table's sheet as raw cells for row-major parsing.
    pub fn read_raw<S: WorkbookSource>(&self, source: &S) -> Result<RawGrid> {
        let workbook = source.open_workbook(&self.path)?;
        let grid = workbook.read_sheet(&self.sheet)?;
        debug!(table = %self.name, sheet = %self.sheet, rows = grid.len(), "read sheet");
        Ok(grid)
    }

    pub fn is_imported(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or_else(|| self.not_imported())
    }

    pub fn dataset_mut(&mut self) -> Result<&mut Dataset> {
        match self.dataset.as_mut() {
            Some(dataset) => Ok(dataset),
            None => Err(IngestError::NotImported {
                table: self.name.clone(),
            }),
        }
    }

    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.dataset = Some(dataset);
    }

    /// Toggle the default index.
    ///
    /// Sets `index_col` as the index when none is set; otherwise clears the
    /// index, discarding the index column when `drop` is true. Tables without
    /// a default index column are left alone.
    pub fn reset_default_index(&mut self, drop: bool) -> Result<()> {
        let Some(index_col) = self.index_col.clone() else {
            return Ok(());
        };
        let table = self.name.clone();
        let dataset = self.dataset_mut()?;
        if dataset.index_name().is_some() {
            if drop {
                dataset.drop_index()?;
            } else {
                dataset.reset_index();
            }
            return Ok(());
        }
        dataset.set_index(&index_col).map_err(|err| match err {
            IngestError::ColumnNotFound { column, .. } => {
                IngestError::ColumnNotFound { column, table }
            }
            other => other,
        })
    }

    fn not_imported(&self) -> IngestError {
        IngestError::NotImported {
            table: self.name.clone(),
        }
    }
}
