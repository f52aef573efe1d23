//! Project-level table validation.
//!
//! Runs the checks a [`TableSpec`] asks for, in a fixed order: structure
//! first (required columns, duplicate columns, duplicate indices), then the
//! column lists, then range, regex and uniqueness checks. A fatal session
//! stops at the first failure; a warning session runs everything except
//! after a missing required column, since later checks would name it.

use preflight_errors::ErrorSession;
use preflight_ingest::{Table, TableSpec};
use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::table::TableChecker;

/// Outcome of validating one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableReport {
    pub table: String,
    pub location: Option<String>,
    pub checks_run: usize,
    pub failures: usize,
    /// Messages recorded while this table was checked.
    pub messages: Vec<String>,
}

impl TableReport {
    pub fn passed(&self) -> bool {
        self.failures == 0
    }
}

type Step<'s> = Box<dyn Fn(&mut TableChecker<'_>) -> Result<bool> + 's>;

fn steps(spec: &TableSpec) -> Vec<Step<'_>> {
    let mut steps: Vec<Step<'_>> = Vec::new();
    steps.push(Box::new(|checker: &mut TableChecker<'_>| -> Result<bool> {
        Ok(checker.no_duplicate_cols())
    }));
    steps.push(Box::new(|checker: &mut TableChecker<'_>| -> Result<bool> {
        Ok(checker.dataset().index_name().is_none() || checker.no_duplicate_indices())
    }));
    steps.push(Box::new(|checker: &mut TableChecker<'_>| {
        checker.lst_cols_populated(None)
    }));
    steps.push(Box::new(|checker: &mut TableChecker<'_>| {
        checker.lst_cols_all_non_blank(None)
    }));
    steps.push(Box::new(|checker: &mut TableChecker<'_>| {
        checker.lst_cols_all_numeric(None)
    }));
    for range in &spec.range_checks {
        steps.push(Box::new(move |checker: &mut TableChecker<'_>| {
            let cols = (!range.cols.is_empty()).then_some(range.cols.as_slice());
            checker.lst_cols_all_in_numeric_range(cols, Some(range.min), Some(range.max))
        }));
    }
    for regex in &spec.regex_checks {
        steps.push(Box::new(move |checker: &mut TableChecker<'_>| {
            checker.col_vals_match_regex(&regex.col, &regex.pattern, regex.ignore_case)
        }));
    }
    for col in &spec.unique_cols {
        steps.push(Box::new(move |checker: &mut TableChecker<'_>| {
            checker.no_duplicate_col_vals(col)
        }));
    }
    steps
}

/// Validate an imported table against its project entry.
///
/// Sets the table's default index first when its column is present.
pub fn check_table(
    spec: &TableSpec,
    table: &mut Table,
    session: &mut ErrorSession,
) -> Result<TableReport> {
    if let Some(index) = table.index_col.clone() {
        let dataset = table.dataset()?;
        if dataset.index_name().is_none() && dataset.has_column(&index) {
            table.reset_default_index(false)?;
        }
    }

    let continue_on_failure = session.is_warning();
    let logged_before = session.accumulated().len();
    let mut checks_run = 0;
    let mut failures = 0;
    {
        let mut checker = TableChecker::for_table(table, session)?;
        if let Some(location) = &spec.location {
            checker = checker.with_location(location.clone());
        }

        checks_run += 1;
        if checker.contains_required_cols(None) {
            for step in steps(spec) {
                checks_run += 1;
                if !step(&mut checker)? {
                    failures += 1;
                    if !continue_on_failure {
                        break;
                    }
                }
            }
        } else {
            failures += 1;
        }
    }

    let messages = session
        .accumulated()
        .get(logged_before..)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    info!(table = %table.name, checks_run, failures, "validated table");
    Ok(TableReport {
        table: table.name.clone(),
        location: spec.location.clone(),
        checks_run,
        failures,
        messages,
    })
}
