use std::path::PathBuf;

use preflight_validate::TableReport;
use serde::Serialize;

/// Outcome of one `preflight check` run.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub project: PathBuf,
    pub warnings: bool,
    pub files: Vec<FileSummary>,
    pub tables: Vec<TableSummary>,
    /// Every message the run reported, in order.
    pub messages: Vec<String>,
    pub has_errors: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub path: PathBuf,
    pub sheets: Vec<String>,
    pub passed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: Option<usize>,
    pub status: TableStatus,
    pub report: Option<TableReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Passed,
    Failed,
    /// Not checked: its file failed preflight or an earlier fatal failure
    /// stopped the run.
    Skipped,
}

impl CheckResult {
    pub fn failed_tables(&self) -> usize {
        self.tables
            .iter()
            .filter(|table| table.status == TableStatus::Failed)
            .count()
    }
}
