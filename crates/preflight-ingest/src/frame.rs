//! DataFrame construction from raw sheet cells.
//!
//! Sheets arrive as grids of strings. The first row is the header; column
//! types are inferred per column (all-integer, all-float, otherwise string)
//! and blank cells become nulls.

use std::collections::{HashMap, HashSet};

use polars::prelude::{Column, DataFrame, NamedFrom, Series};
use preflight_common::parse_f64;

use crate::error::{IngestError, Result};

const UNNAMED_PREFIX: &str = "Unnamed:";

/// Options applied when turning a sheet grid into a frame.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Drop columns whose header cell was blank.
    pub drop_blank_columns: bool,
    /// Drop every column after this one.
    pub last_column: Option<String>,
}

/// Rename repeated headers `name`, `name.1`, `name.2`, ...
///
/// This is the collision suffixing spreadsheet importers apply; the
/// duplicate-column check looks for exactly this artifact.
pub fn mangle_duplicate_headers(headers: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut mangled = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        if seen.contains(&name) {
            let counter = counts.entry(header.clone()).or_insert(1);
            loop {
                let candidate = format!("{header}.{counter}");
                *counter += 1;
                if !seen.contains(&candidate) {
                    name = candidate;
                    break;
                }
            }
        }
        seen.insert(name.clone());
        mangled.push(name);
    }
    mangled
}

/// Build a frame from a grid whose first row is the header.
pub fn frame_from_grid(
    grid: &[Vec<String>],
    options: &ImportOptions,
    table: &str,
) -> Result<DataFrame> {
    let Some((header_row, data_rows)) = grid.split_first() else {
        return Ok(DataFrame::empty());
    };
    let named: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let trimmed = cell.trim();
            if trimmed.is_empty() {
                format!("{UNNAMED_PREFIX} {idx}")
            } else {
                trimmed.to_string()
            }
        })
        .collect();
    let headers = mangle_duplicate_headers(&named);

    let mut keep: Vec<usize> = (0..headers.len())
        .filter(|&idx| !(options.drop_blank_columns && headers[idx].starts_with(UNNAMED_PREFIX)))
        .collect();

    if let Some(last) = &options.last_column {
        let position = keep
            .iter()
            .position(|&idx| &headers[idx] == last)
            .ok_or_else(|| IngestError::ColumnNotFound {
                column: last.clone(),
                table: table.to_string(),
            })?;
        keep.truncate(position + 1);
    }

    let kept_headers: Vec<String> = keep.iter().map(|&idx| headers[idx].clone()).collect();
    let rows: Vec<Vec<String>> = data_rows
        .iter()
        .map(|row| {
            keep.iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    frame_from_rows(&kept_headers, &rows)
}

/// Build a frame from explicit headers and string rows.
pub fn frame_from_rows(headers: &[String], rows: &[Vec<String>]) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for (col_idx, header) in headers.iter().enumerate() {
        let cells: Vec<Option<&str>> = rows
            .iter()
            .map(|row| {
                row.get(col_idx)
                    .map(|value| value.trim())
                    .filter(|value| !value.is_empty())
            })
            .collect();
        columns.push(infer_column(header, &cells));
    }
    Ok(DataFrame::new(columns)?)
}

fn infer_column(name: &str, cells: &[Option<&str>]) -> Column {
    let present = || cells.iter().flatten();
    let any_present = present().next().is_some();

    if any_present && present().all(|value| value.parse::<i64>().is_ok()) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|cell| cell.and_then(|value| value.parse::<i64>().ok()))
            .collect();
        return Series::new(name.into(), values).into();
    }
    if any_present && present().all(|value| parse_f64(value).is_some()) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|cell| cell.and_then(parse_f64))
            .collect();
        return Series::new(name.into(), values).into();
    }
    let values: Vec<Option<&str>> = cells.to_vec();
    Series::new(name.into(), values).into()
}
