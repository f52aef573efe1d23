//! Project files: which tables to import and what to check in each.
//!
//! ```toml
//! codes = "error_codes.csv"
//!
//! [session]
//! header = "The program encountered the following fatal error:"
//! warnings = true
//!
//! [[table]]
//! name = "Table1"
//! path = "data/tbl1.csv"
//! index = "idx"
//! required_cols = ["idx", "col_1", "col_2"]
//! numeric_cols = ["idx", "col_1"]
//!
//! [[table.range_checks]]
//! cols = ["col_1"]
//! min = 0
//! max = 50
//! ```
//!
//! Relative paths are resolved against the directory holding the project
//! file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::row_major::RowMajorParse;
use crate::table::{Table, TableMetadata};

/// Session-wide reporting options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSpec {
    /// Printed once before the first fatal message.
    pub header: String,
    /// Report failures as warnings and keep checking.
    pub warnings: bool,
    pub print: bool,
    pub log: bool,
}

impl Default for SessionSpec {
    fn default() -> Self {
        Self {
            header: String::new(),
            warnings: false,
            print: true,
            log: false,
        }
    }
}

/// Numeric range applied to a list of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeCheckSpec {
    /// Defaults to the table's numeric columns when empty.
    #[serde(default)]
    pub cols: Vec<String>,
    pub min: f64,
    pub max: f64,
}

/// Regex every value of a column must match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexCheckSpec {
    pub col: String,
    pub pattern: String,
    #[serde(default)]
    pub ignore_case: bool,
}

/// One table entry of a project file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub name: String,
    pub path: PathBuf,
    /// Defaults to the file stem, which is the sheet name of a `.csv` file.
    pub sheet: Option<String>,
    pub index: Option<String>,
    pub last_column: Option<String>,
    /// Error-code location for this table's checks.
    pub location: Option<String>,
    pub required_cols: Vec<String>,
    pub numeric_cols: Vec<String>,
    pub populated_cols: Vec<String>,
    pub nonblank_cols: Vec<String>,
    pub unique_cols: Vec<String>,
    pub range_checks: Vec<RangeCheckSpec>,
    pub regex_checks: Vec<RegexCheckSpec>,
    /// Parse the sheet as an embedded row-major table.
    pub row_major: Option<RowMajorParse>,
    /// `[raw header, column name]` pairs for row-major imports.
    pub import_col_map: Vec<(String, String)>,
}

impl TableSpec {
    /// Sheet name, falling back to the file stem.
    pub fn sheet_name(&self) -> String {
        self.sheet.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default()
                .to_string()
        })
    }

    pub fn metadata(&self) -> TableMetadata {
        TableMetadata {
            required_cols: self.required_cols.clone(),
            numeric_cols: self.numeric_cols.clone(),
            populated_cols: self.populated_cols.clone(),
            nonblank_cols: self.nonblank_cols.clone(),
        }
    }

    /// Build the (not yet imported) table described by this entry.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            self.path.clone(),
            self.name.clone(),
            self.sheet_name(),
            self.index.as_deref(),
        )
        .with_metadata(self.metadata())
        .with_import_col_map(self.import_col_map.iter().cloned());
        table.last_column.clone_from(&self.last_column);
        table
    }
}

/// A parsed project file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSpec {
    /// Error-code table CSV.
    pub codes: Option<PathBuf>,
    pub session: SessionSpec,
    #[serde(rename = "table")]
    pub tables: Vec<TableSpec>,
}

impl ProjectSpec {
    /// Load a project file, resolving relative paths against its directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IngestError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::read(path, e))?;
        let mut project = Self::from_toml(&text).map_err(|source| IngestError::Project {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            project.resolve_paths(base);
        }
        debug!(
            path = %path.display(),
            tables = project.tables.len(),
            "loaded project file"
        );
        Ok(project)
    }

    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Prefix relative paths with `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        if let Some(codes) = &mut self.codes {
            *codes = resolve(base, codes);
        }
        for table in &mut self.tables {
            table.path = resolve(base, &table.path);
        }
    }

    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|table| table.name == name)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"
codes = "codes.csv"

[session]
header = "Fatal:"
warnings = true

[[table]]
name = "Table1"
path = "data/tbl1.csv"
index = "idx"
location = "tbl1Procedure"
required_cols = ["idx", "col_1", "col_2"]
numeric_cols = ["idx", "col_1"]

[[table.range_checks]]
cols = ["col_1"]
min = 0
max = 50

[[table.regex_checks]]
col = "col_2"
pattern = "[a-z]+_[a-z]+$"
ignore_case = true

[[table]]
name = "Raw"
path = "raw.csv"
sheet = "raw_table"
import_col_map = [["idx_raw", "idx"], ["col #1", "col_1"]]

[table.row_major]
flag_start_bound = "Data"
icol_start_bound = 0
flag_end_bound = "<blank>"
icol_end_bound = 0
iheader_rowoffset_from_flag = 1
idata_rowoffset_from_flag = 2
"#;

    #[test]
    fn test_parse_project() {
        let project = ProjectSpec::from_toml(PROJECT).expect("parse");
        assert_eq!(project.session.header, "Fatal:");
        assert!(project.session.warnings);
        assert!(project.session.print);
        assert_eq!(project.tables.len(), 2);

        let tbl1 = project.table("Table1").expect("tbl1");
        assert_eq!(tbl1.sheet_name(), "tbl1");
        assert_eq!(tbl1.location.as_deref(), Some("tbl1Procedure"));
        assert_eq!(tbl1.range_checks[0].max, 50.0);
        assert!(tbl1.regex_checks[0].ignore_case);

        let raw = project.table("Raw").expect("raw");
        assert_eq!(raw.sheet_name(), "raw_table");
        assert_eq!(raw.import_col_map[1].0, "col #1");
        assert_eq!(raw.row_major.as_ref().map(|p| p.idata_rowoffset_from_flag), Some(2));
    }

    #[test]
    fn test_resolve_paths() {
        let mut project = ProjectSpec::from_toml(PROJECT).expect("parse");
        project.resolve_paths(Path::new("/proj"));
        assert_eq!(project.codes, Some(PathBuf::from("/proj/codes.csv")));
        assert_eq!(project.tables[0].path, PathBuf::from("/proj/data/tbl1.csv"));
    }

    #[test]
    fn test_to_table() {
        let project = ProjectSpec::from_toml(PROJECT).expect("parse");
        let table = project.tables[0].to_table();
        assert_eq!(table.name, "Table1");
        assert_eq!(table.index_col.as_deref(), Some("idx"));
        assert_eq!(table.metadata.numeric_cols, vec!["idx", "col_1"]);
        assert!(!table.is_imported());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(ProjectSpec::from_toml("[[table]\nname=").is_err());
    }
}
