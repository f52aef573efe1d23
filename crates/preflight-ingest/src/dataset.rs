//! Dataset: a DataFrame with an optional row index.
//!
//! Polars frames have no row labels, so the index is modelled as one named
//! column that is hidden from [`Dataset::column_names`] while it is set.
//! Without an index the row labels are the row positions.

use polars::prelude::{AnyValue, Column, DataFrame};
use preflight_common::any_to_string;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    frame: DataFrame,
    index: Option<String>,
}

impl Dataset {
    /// Wrap a frame with a positional index.
    pub fn new(frame: DataFrame) -> Self {
        Self { frame, index: None }
    }

    /// Wrap a frame and use `index` as its row index.
    pub fn with_index(frame: DataFrame, index: &str) -> Result<Self> {
        let mut dataset = Self::new(frame);
        dataset.set_index(index)?;
        Ok(dataset)
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index.as_deref()
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Column names in frame order, excluding the index column.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .filter(|name| Some(name.as_str()) != self.index.as_deref())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Data column by name; the index column is not addressable this way.
    pub fn column(&self, name: &str) -> Option<&Column> {
        if self.index.as_deref() == Some(name) {
            return None;
        }
        self.frame.column(name).ok()
    }

    /// Row labels as strings: index values when set, row positions otherwise.
    pub fn index_labels(&self) -> Vec<String> {
        match self.index.as_deref().and_then(|name| self.frame.column(name).ok()) {
            Some(column) => column_values(column).map(any_to_string).collect(),
            None => (0..self.frame.height()).map(|row| row.to_string()).collect(),
        }
    }

    /// Use an existing column as the row index.
    pub fn set_index(&mut self, name: &str) -> Result<()> {
        if self.frame.column(name).is_err() {
            return Err(IngestError::ColumnNotFound {
                column: name.to_string(),
                table: "dataset".to_string(),
            });
        }
        self.index = Some(name.to_string());
        Ok(())
    }

    /// Return the index column to the data columns.
    pub fn reset_index(&mut self) {
        self.index = None;
    }

    /// Clear the index and discard its column.
    pub fn drop_index(&mut self) -> Result<()> {
        if let Some(name) = self.index.take() {
            self.frame = self.frame.drop(&name)?;
        }
        Ok(())
    }
}

/// Iterate the cells of a column, reading failures as nulls.
pub fn column_values(column: &Column) -> impl Iterator<Item = AnyValue<'_>> + '_ {
    (0..column.len()).map(move |idx| column.get(idx).unwrap_or(AnyValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("idx".into(), vec![1i64, 2, 3]).into(),
            Series::new("col_1".into(), vec!["a", "b", "c"]).into(),
        ])
        .expect("frame")
    }

    #[test]
    fn test_positional_index() {
        let dataset = Dataset::new(frame());
        assert_eq!(dataset.column_names(), vec!["idx", "col_1"]);
        assert_eq!(dataset.index_labels(), vec!["0", "1", "2"]);
        assert!(dataset.has_column("idx"));
    }

    #[test]
    fn test_set_and_reset_index() {
        let mut dataset = Dataset::with_index(frame(), "idx").expect("index");
        assert_eq!(dataset.column_names(), vec!["col_1"]);
        assert_eq!(dataset.index_labels(), vec!["1", "2", "3"]);
        assert!(dataset.column("idx").is_none());

        dataset.reset_index();
        assert!(dataset.column("idx").is_some());
        assert_eq!(dataset.index_name(), None);
    }

    #[test]
    fn test_drop_index() {
        let mut dataset = Dataset::with_index(frame(), "idx").expect("index");
        dataset.drop_index().expect("drop");
        assert_eq!(dataset.column_names(), vec!["col_1"]);
        assert!(dataset.frame().column("idx").is_err());
        assert_eq!(dataset.index_labels(), vec!["0", "1", "2"]);
    }

    #[test]
    fn test_set_missing_index() {
        let mut dataset = Dataset::new(frame());
        assert!(dataset.set_index("nope").is_err());
    }
}
