//! Workbook preflight: files exist, open, and hold the expected sheets.

use std::path::{Path, PathBuf};

use preflight_errors::ErrorSession;
use preflight_ingest::{Workbook, WorkbookSource};
use serde::Serialize;
use tracing::{debug, warn};

/// Error-code location for every file check.
pub const FILE_CHECK_LOCATION: &str = "CheckFilesProcedure";

const FILE_NOT_FOUND: i64 = 1;
const NOT_A_WORKBOOK: i64 = 2;
const SHEET_NOT_FOUND: i64 = 3;

/// A file and the sheets it must contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRequirement {
    pub path: PathBuf,
    pub sheets: Vec<String>,
}

impl FileRequirement {
    pub fn new<I, S>(path: impl Into<PathBuf>, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            sheets: sheets.into_iter().map(Into::into).collect(),
        }
    }
}

/// Runs the file checks as warnings so every file is examined.
pub struct FileChecker<'a, S: WorkbookSource> {
    source: &'a S,
    session: &'a mut ErrorSession,
    failed: bool,
}

impl<'a, S: WorkbookSource> FileChecker<'a, S> {
    /// Switches the session to warning mode.
    pub fn new(source: &'a S, session: &'a mut ErrorSession) -> Self {
        session.set_warning(true);
        Self {
            source,
            session,
            failed: false,
        }
    }

    pub fn session(&self) -> &ErrorSession {
        self.session
    }

    /// True when any check run so far has failed.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    /// Check every file; returns false if any check failed.
    pub fn check_all(&mut self, files: &[FileRequirement]) -> bool {
        for file in files {
            self.check_file(file);
        }
        !self.failed
    }

    /// Existence, then opening, then sheets; later steps are skipped once
    /// one fails.
    pub fn check_file(&mut self, file: &FileRequirement) -> bool {
        if !self.file_exists(&file.path) {
            return false;
        }
        let Some(workbook) = self.workbook_opens(&file.path) else {
            return false;
        };
        self.all_sheets_exist(&workbook, &file.sheets)
    }

    pub fn file_exists(&mut self, path: &Path) -> bool {
        let exists = self.source.file_exists(path);
        self.fail_unless(exists, FILE_NOT_FOUND, path.display().to_string())
    }

    /// Open the workbook, recording a failure when it cannot be opened.
    pub fn workbook_opens(&mut self, path: &Path) -> Option<S::Book> {
        match self.source.open_workbook(path) {
            Ok(workbook) => Some(workbook),
            Err(error) => {
                warn!(path = %path.display(), %error, "workbook failed to open");
                self.fail_unless(false, NOT_A_WORKBOOK, path.display().to_string());
                None
            }
        }
    }

    /// Every sheet is checked; returns false if any is missing.
    pub fn all_sheets_exist(&mut self, workbook: &S::Book, sheets: &[String]) -> bool {
        let mut all = true;
        for sheet in sheets {
            all &= self.sheet_exists(workbook, sheet);
        }
        all
    }

    pub fn sheet_exists(&mut self, workbook: &S::Book, sheet: &str) -> bool {
        let exists = workbook.has_sheet(sheet);
        let param = format!("Missing: {sheet} in {}", workbook.path().display());
        self.fail_unless(exists, SHEET_NOT_FOUND, param)
    }

    fn fail_unless(&mut self, passed: bool, local_code: i64, param: String) -> bool {
        if self
            .session
            .mark_failure(!passed, local_code, Some(FILE_CHECK_LOCATION), Some(param))
        {
            debug!(local_code, "file check failed");
            self.failed = true;
            self.session.record();
        }
        passed
    }
}
