//! Table checks.
//!
//! [`TableChecker`] runs predicate checks over one [`Dataset`]. A failing
//! check stages its local code and parameter on the [`ErrorSession`], records
//! the message and returns `false`; a passing check returns `true` and leaves
//! the session untouched.
//!
//! Batch checks (`lst_cols_*`) take an explicit column list or fall back to
//! the table's [`TableMetadata`], and stop at the first failing column.

use polars::prelude::Column;
use preflight_common::{any_to_f64, any_to_string, is_missing};
use preflight_errors::ErrorSession;
use preflight_ingest::{Dataset, Table, TableMetadata, column_values};
use tracing::{debug, trace};

use crate::check::Check;
use crate::error::{CheckError, Result};
use crate::util::{
    anchored_regex, duplicate_column_names, duplicate_values, first_missing, first_repeated,
    in_range,
};

/// Check runner bound to one dataset and a caller-owned error session.
pub struct TableChecker<'a> {
    dataset: &'a Dataset,
    metadata: Option<&'a TableMetadata>,
    session: &'a mut ErrorSession,
    location: Option<String>,
}

impl<'a> TableChecker<'a> {
    /// Check a bare dataset; every check reports under its own name.
    pub fn new(dataset: &'a Dataset, session: &'a mut ErrorSession) -> Self {
        Self {
            dataset,
            metadata: None,
            session,
            location: None,
        }
    }

    /// Check an imported table, with its column lists as batch defaults.
    pub fn for_table(table: &'a Table, session: &'a mut ErrorSession) -> Result<Self> {
        Ok(Self::new(table.dataset()?, session).with_metadata(&table.metadata))
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: &'a TableMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Report every failure under `location` instead of the check name.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    pub fn session(&self) -> &ErrorSession {
        self.session
    }

    /// Every required column is present; the index column counts.
    ///
    /// Uses the metadata's `required_cols` when `required` is `None`.
    pub fn contains_required_cols(&mut self, required: Option<&[String]>) -> bool {
        let required = self.columns_or(required, |meta| &meta.required_cols);
        let mut present = self.dataset.column_names();
        present.extend(self.dataset.index_name().map(str::to_string));
        let missing = first_missing(required.as_slice(), &present);
        self.gate(Check::ContainsRequiredCols, missing.map(str::to_string))
    }

    /// Column names are unique and carry no collision suffix.
    pub fn no_duplicate_cols(&mut self) -> bool {
        let duplicates = duplicate_column_names(&self.dataset.column_names());
        let param = (!duplicates.is_empty()).then(|| duplicates.join(", "));
        self.gate(Check::NoDuplicateCols, param)
    }

    /// Row index labels are unique.
    pub fn no_duplicate_indices(&mut self) -> bool {
        let duplicates = duplicate_values(&self.dataset.index_labels());
        let param = (!duplicates.is_empty())
            .then(|| format!("Duplicate indices: {}", duplicates.join(", ")));
        self.gate(Check::NoDuplicateIndices, param)
    }

    /// Column has no missing values.
    pub fn col_populated(&mut self, col: &str) -> Result<bool> {
        let column = self.column(col)?;
        let populated = !column_values(column).any(|value| is_missing(&value));
        Ok(self.gate_column(Check::ColPopulated, col, populated))
    }

    /// Every listed column is populated; defaults to `populated_cols`.
    pub fn lst_cols_populated(&mut self, cols: Option<&[String]>) -> Result<bool> {
        let cols = self.columns_or(cols, |meta| &meta.populated_cols);
        self.all_columns(&cols, Self::col_populated)
    }

    /// Every listed value is a column name.
    pub fn columns_contain_list_vals<S: AsRef<str>>(&mut self, values: &[S]) -> bool {
        let missing = first_missing(values, &self.dataset.column_names());
        self.gate(
            Check::ColumnsContainListVals,
            missing.map(|value| format!("Missing: {value}")),
        )
    }

    /// Every listed value is a row index label.
    pub fn index_contains_list_vals<S: AsRef<str>>(&mut self, values: &[S]) -> bool {
        let missing = first_missing(values, &self.dataset.index_labels());
        self.gate(
            Check::IndexContainsListVals,
            missing.map(|value| format!("Missing: {value}")),
        )
    }

    /// Column has at least one non-missing value.
    pub fn col_non_blank(&mut self, col: &str) -> Result<bool> {
        let column = self.column(col)?;
        let non_blank = column_values(column).any(|value| !is_missing(&value));
        Ok(self.gate_column(Check::ColNonBlank, col, non_blank))
    }

    /// Every listed column is non-blank; defaults to `nonblank_cols`.
    pub fn lst_cols_all_non_blank(&mut self, cols: Option<&[String]>) -> Result<bool> {
        let cols = self.columns_or(cols, |meta| &meta.nonblank_cols);
        self.all_columns(&cols, Self::col_non_blank)
    }

    /// Every value coerces to a number; missing values do not.
    pub fn col_numeric(&mut self, col: &str) -> Result<bool> {
        let column = self.column(col)?;
        let numeric = column_values(column).all(|value| any_to_f64(value).is_some());
        Ok(self.gate_column(Check::ColNumeric, col, numeric))
    }

    /// Every listed column is numeric; defaults to `numeric_cols`.
    pub fn lst_cols_all_numeric(&mut self, cols: Option<&[String]>) -> Result<bool> {
        let cols = self.columns_or(cols, |meta| &meta.numeric_cols);
        self.all_columns(&cols, Self::col_numeric)
    }

    /// Every value is numeric and within the inclusive limits given.
    pub fn col_vals_in_numeric_range(
        &mut self,
        col: &str,
        llim: Option<f64>,
        ulim: Option<f64>,
    ) -> Result<bool> {
        let column = self.column(col)?;
        let within = column_values(column)
            .all(|value| any_to_f64(value).is_some_and(|number| in_range(number, llim, ulim)));
        Ok(self.gate_column(Check::ColValsInNumericRange, col, within))
    }

    /// Range check over several columns; defaults to `numeric_cols`.
    pub fn lst_cols_all_in_numeric_range(
        &mut self,
        cols: Option<&[String]>,
        llim: Option<f64>,
        ulim: Option<f64>,
    ) -> Result<bool> {
        let cols = self.columns_or(cols, |meta| &meta.numeric_cols);
        self.all_columns(&cols, |checker, col| {
            checker.col_vals_in_numeric_range(col, llim, ulim)
        })
    }

    /// Every value, as text, matches `pattern` from its first character.
    pub fn col_vals_match_regex(
        &mut self,
        col: &str,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<bool> {
        let regex = anchored_regex(pattern, ignore_case)?;
        let values = self.column_strings(col)?;
        let matched = values.iter().all(|value| regex.is_match(value));
        Ok(self.gate_column(Check::ColValsMatchRegex, col, matched))
    }

    /// Every listed value occurs somewhere in the column.
    pub fn col_contains_list_vals<S: AsRef<str>>(
        &mut self,
        col: &str,
        values: &[S],
    ) -> Result<bool> {
        let present = self.column_strings(col)?;
        let missing = first_missing(values, &present);
        Ok(self.gate(
            Check::ColContainsListVals,
            missing.map(|value| format!("Missing: {value}")),
        ))
    }

    /// No listed value occurs in the column more than once.
    pub fn col_contains_nodups_list_vals<S: AsRef<str>>(
        &mut self,
        col: &str,
        values: &[S],
    ) -> Result<bool> {
        let present = self.column_strings(col)?;
        let repeated = first_repeated(values, &present);
        Ok(self.gate(Check::ColContainsNodupsListVals, repeated.map(str::to_string)))
    }

    /// The `col2` value on the first row where `col1 == val` matches `pattern`.
    pub fn table_loc_matches_regex(
        &mut self,
        col1: &str,
        val: &str,
        col2: &str,
        pattern: &str,
        ignore_case: bool,
    ) -> Result<bool> {
        let regex = anchored_regex(pattern, ignore_case)?;
        let keys = self.column_strings(col1)?;
        let targets = self.column_strings(col2)?;
        let row = keys
            .iter()
            .position(|key| key == val)
            .ok_or_else(|| CheckError::LookupRowNotFound {
                column: col1.to_string(),
                value: val.to_string(),
            })?;
        let value = targets[row].clone();
        let param = (!regex.is_match(&value)).then_some(value);
        Ok(self.gate(Check::TableLocMatchesRegex, param))
    }

    /// Every value in the column is distinct.
    pub fn no_duplicate_col_vals(&mut self, col: &str) -> Result<bool> {
        let values = self.column_strings(col)?;
        let unique = duplicate_values(&values).is_empty();
        Ok(self.gate_column(Check::NoDuplicateColVals, col, unique))
    }

    fn column(&self, name: &str) -> Result<&'a Column> {
        let dataset: &'a Dataset = self.dataset;
        dataset
            .frame()
            .column(name)
            .map_err(|_| CheckError::ColumnNotFound {
                column: name.to_string(),
            })
    }

    fn column_strings(&self, name: &str) -> Result<Vec<String>> {
        Ok(column_values(self.column(name)?).map(any_to_string).collect())
    }

    fn columns_or(
        &self,
        explicit: Option<&[String]>,
        from_metadata: impl Fn(&TableMetadata) -> &Vec<String>,
    ) -> Vec<String> {
        match explicit {
            Some(cols) => cols.to_vec(),
            None => self
                .metadata
                .map(|meta| from_metadata(meta).clone())
                .unwrap_or_default(),
        }
    }

    fn all_columns<F>(&mut self, cols: &[String], mut check: F) -> Result<bool>
    where
        F: FnMut(&mut Self, &str) -> Result<bool>,
    {
        for col in cols {
            if !check(&mut *self, col.as_str())? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn gate_column(&mut self, check: Check, col: &str, passed: bool) -> bool {
        let param = (!passed).then(|| col.to_string());
        self.gate(check, param)
    }

    /// Record `failure` when present; returns whether the check passed.
    fn gate(&mut self, check: Check, failure: Option<String>) -> bool {
        let Some(param) = failure else {
            trace!(check = %check, "check passed");
            return true;
        };
        let location = self
            .location
            .clone()
            .unwrap_or_else(|| check.name().to_string());
        debug!(check = %check, location = %location, param = %param, "check failed");
        if self
            .session
            .mark_failure(true, check.local_code(), Some(location.as_str()), Some(param))
        {
            self.session.record();
        }
        false
    }
}
