use anyhow::Result;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use preflight_errors::{EntryKind, ErrorCodeEntry};

use crate::types::{CheckResult, TableStatus};

pub fn print_summary(result: &CheckResult) {
    println!("Project: {}", result.project.display());
    println!(
        "Mode: {}",
        if result.warnings { "warnings" } else { "fatal" }
    );
    println!("{}", files_table(result));
    println!("{}", tables_table(result));
    if result.has_errors {
        eprintln!("{} message(s) reported", result.messages.len());
    }
}

pub fn print_json(result: &CheckResult) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

pub fn files_table(result: &CheckResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Sheets"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    for file in &result.files {
        table.add_row(vec![
            Cell::new(file.path.display()),
            Cell::new(file.sheets.join(", ")),
            pass_cell(file.passed),
        ]);
    }
    table
}

pub fn tables_table(result: &CheckResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Checks"),
        header_cell("Failures"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);

    let mut total_checks = 0;
    let mut total_failures = 0;
    for summary in &result.tables {
        let (checks, failures) = match &summary.report {
            Some(report) => (Some(report.checks_run), Some(report.failures)),
            None => (None, None),
        };
        total_checks += checks.unwrap_or_default();
        total_failures += failures.unwrap_or_default();
        table.add_row(vec![
            Cell::new(&summary.name),
            count_cell(summary.rows, None),
            count_cell(checks, None),
            count_cell(failures, Some(Color::Red)),
            status_cell(summary.status),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_checks).add_attribute(Attribute::Bold),
        count_cell(Some(total_failures), Some(Color::Red)).add_attribute(Attribute::Bold),
        dim_cell("-"),
    ]);
    table
}

/// Code table rows as printed by `preflight codes`.
pub fn codes_table(entries: &[&ErrorCodeEntry]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Code", "Class", "Location", "Message"]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for entry in entries {
        let message = match &entry.kind {
            EntryKind::Base => dim_cell("Base"),
            EntryKind::Message(text) => Cell::new(text),
        };
        table.add_row(vec![
            Cell::new(entry.code),
            Cell::new(&entry.class),
            Cell::new(&entry.location),
            message,
        ]);
    }
    table
}

fn pass_cell(passed: bool) -> Cell {
    if passed {
        Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new("✗").fg(Color::Red).add_attribute(Attribute::Bold)
    }
}

fn status_cell(status: TableStatus) -> Cell {
    match status {
        TableStatus::Passed => Cell::new("PASS").fg(Color::Green),
        TableStatus::Failed => Cell::new("FAIL")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        TableStatus::Skipped => dim_cell("SKIP"),
    }
}

fn count_cell(count: Option<usize>, highlight: Option<Color>) -> Cell {
    match (count, highlight) {
        (Some(value), Some(color)) if value > 0 => {
            Cell::new(value).fg(color).add_attribute(Attribute::Bold)
        }
        (Some(value), _) => Cell::new(value),
        (None, _) => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
