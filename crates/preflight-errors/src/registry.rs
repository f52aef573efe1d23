//! Error-code table loaded from CSV.
//!
//! Each row of the table is `(iCode, Class, Locn, Msg_String)`. A row whose
//! message is the literal `Base` registers the base offset for its location;
//! every other row maps an exact report code to message text.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::debug;

use crate::error::{CodeTableError, Result};

/// Base code returned for a location that has no `Base` row.
pub const BASE_CODE_NOT_FOUND: i64 = 10000;

const BASE_MARKER: &str = "Base";

/// Kind of a code table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Defines the base offset for the row's location.
    Base,
    /// Message template for the row's exact code.
    Message(String),
}

/// One row of the error-code table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorCodeEntry {
    pub code: i64,
    pub class: String,
    pub location: String,
    pub kind: EntryKind,
}

impl ErrorCodeEntry {
    pub fn base(code: i64, class: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            code,
            class: class.into(),
            location: location.into(),
            kind: EntryKind::Base,
        }
    }

    pub fn message(
        code: i64,
        class: impl Into<String>,
        location: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            code,
            class: class.into(),
            location: location.into(),
            kind: EntryKind::Message(text.into()),
        }
    }
}

/// Indexed error-code table.
///
/// Lookups are first-match-wins in row order for both base rows and
/// message rows.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: Vec<ErrorCodeEntry>,
    bases: HashMap<String, i64>,
    messages: HashMap<i64, usize>,
}

impl CodeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows in order.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ErrorCodeEntry>,
    {
        let mut table = Self::new();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    /// Append a row, indexing it unless an earlier row already claims its key.
    pub fn insert(&mut self, entry: ErrorCodeEntry) {
        let position = self.entries.len();
        match &entry.kind {
            EntryKind::Base => {
                self.bases
                    .entry(entry.location.clone())
                    .or_insert(entry.code);
            }
            EntryKind::Message(_) => {
                self.messages.entry(entry.code).or_insert(position);
            }
        }
        self.entries.push(entry);
    }

    /// Base code registered for `location`.
    pub fn base_code(&self, location: &str) -> Option<i64> {
        self.bases.get(location).copied()
    }

    /// Message text registered for an exact report code.
    pub fn message(&self, code: i64) -> Option<&str> {
        let position = *self.messages.get(&code)?;
        match &self.entries[position].kind {
            EntryKind::Message(text) => Some(text.as_str()),
            EntryKind::Base => None,
        }
    }

    /// All rows in load order.
    pub fn entries(&self) -> &[ErrorCodeEntry] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Read-only registry translating `(location, local code)` into messages.
///
/// Shared between sessions behind an `Arc`; never mutated after load.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    table: CodeTable,
}

impl ErrorRegistry {
    /// Create a registry from an already built table.
    pub fn new(table: CodeTable) -> Self {
        Self { table }
    }

    /// Ingest code table rows.
    pub fn load<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = ErrorCodeEntry>,
    {
        Self::new(CodeTable::from_entries(entries))
    }

    /// Load the code table from a CSV file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| CodeTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_reader(file)?;
        debug!(
            path = %path.display(),
            rows = registry.table.len(),
            "loaded error code table"
        );
        Ok(registry)
    }

    /// Load the code table from CSV text with an `iCode,Class,Locn,Msg_String` header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let code_idx = find_column(&headers, "iCode")?;
        let class_idx = find_column(&headers, "Class")?;
        let location_idx = find_column(&headers, "Locn")?;
        let message_idx = find_column(&headers, "Msg_String")?;

        let mut table = CodeTable::new();
        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }
            let raw_code = record.get(code_idx).unwrap_or("");
            let code = raw_code
                .parse::<i64>()
                .map_err(|_| CodeTableError::InvalidCode {
                    value: raw_code.to_string(),
                    line: record.position().map_or(0, csv::Position::line),
                })?;
            let class = record.get(class_idx).unwrap_or("");
            let location = record.get(location_idx).unwrap_or("");
            let message = record.get(message_idx).unwrap_or("");

            let entry = if message == BASE_MARKER {
                ErrorCodeEntry::base(code, class, location)
            } else {
                ErrorCodeEntry::message(code, class, location, message)
            };
            table.insert(entry);
        }

        Ok(Self::new(table))
    }

    /// Underlying code table.
    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Base code for `location`, or [`BASE_CODE_NOT_FOUND`].
    pub fn resolve_base_code(&self, location: &str) -> i64 {
        self.table
            .base_code(location)
            .unwrap_or(BASE_CODE_NOT_FOUND)
    }

    /// `base_code + local_code`, or `None` when the base lookup failed.
    pub fn compute_report_code(&self, base_code: i64, local_code: i64) -> Option<i64> {
        (base_code != BASE_CODE_NOT_FOUND).then(|| base_code + local_code)
    }

    /// Message text for one resolved failure, without any parameter.
    ///
    /// Missing base rows and missing report codes degrade to synthesized
    /// messages rather than errors.
    pub fn message_for(&self, location: &str, base_code: i64, report_code: i64) -> String {
        if base_code == BASE_CODE_NOT_FOUND {
            return format!("Base error code not found for function: {location}");
        }
        match self.table.message(report_code) {
            Some(text) => text.to_string(),
            None => format!("Error code not found for {location}: {report_code}"),
        }
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| CodeTableError::MissingColumn {
            column: name.to_string(),
        })
}
