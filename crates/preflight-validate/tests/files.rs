//! Workbook preflight against files on disk.

use std::fs;
use std::sync::Arc;

use preflight_errors::{ErrorRegistry, ErrorSession};
use preflight_ingest::CsvWorkbookSource;
use preflight_validate::{FileChecker, FileRequirement};

const CODES: &str = "
iCode,Class,Locn,Msg_String
100,CheckExcelFiles,CheckFilesProcedure,Base
101,CheckExcelFiles,CheckFilesProcedure,ERROR: Input file not found
102,CheckExcelFiles,CheckFilesProcedure,ERROR: Input file not a valid Excel file
103,CheckExcelFiles,CheckFilesProcedure,ERROR: Required input file sheet not found
";

fn session() -> ErrorSession {
    let registry = ErrorRegistry::from_reader(CODES.as_bytes()).expect("codes");
    ErrorSession::new(Arc::new(registry))
        .with_header("The program encountered the following fatal error:")
        .with_print(false)
}

fn workbook_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    fs::write(dir.path().join("first_sheet.csv"), "a\n1\n").expect("write");
    fs::write(dir.path().join("second_sheet.csv"), "b\n2\n").expect("write");
    dir
}

#[test]
fn valid_workbook_passes() {
    let dir = workbook_dir();
    let mut session = session();
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    let files = [FileRequirement::new(dir.path(), ["first_sheet", "second_sheet"])];
    assert!(checker.check_all(&files));
    assert_eq!(session.accumulated(), "");
    assert!(session.is_warning());
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("xxxx.csv");
    let mut session = session();
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    assert!(!checker.check_all(&[FileRequirement::new(&path, ["first_sheet"])]));
    assert_eq!(
        session.accumulated(),
        format!("ERROR: Input file not found: {}", path.display())
    );
    assert!(!session.has_error());
}

#[test]
fn non_workbook_file_is_reported() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dummy_file.docx");
    fs::write(&path, "not a sheet").expect("write");
    let mut session = session();
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    assert!(!checker.check_all(&[FileRequirement::new(&path, Vec::<String>::new())]));
    assert!(session
        .accumulated()
        .starts_with("ERROR: Input file not a valid Excel file"));
}

#[test]
fn every_missing_sheet_is_reported() {
    let dir = workbook_dir();
    let mut session = session();
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    let files = [FileRequirement::new(
        dir.path(),
        ["first_sheet", "x_sheet", "second_sheet", "y_sheet"],
    )];
    assert!(!checker.check_all(&files));
    let expected = format!(
        "ERROR: Required input file sheet not found: Missing: x_sheet in {0}\n\
         ERROR: Required input file sheet not found: Missing: y_sheet in {0}",
        dir.path().display()
    );
    assert_eq!(session.accumulated(), expected);
}

#[test]
fn later_files_checked_after_failure() {
    let dir = workbook_dir();
    let mut session = session();
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    let files = [
        FileRequirement::new(dir.path().join("absent.csv"), ["s"]),
        FileRequirement::new(dir.path().join("first_sheet.csv"), ["first_sheet"]),
        FileRequirement::new(dir.path().join("first_sheet.csv"), ["other"]),
    ];
    assert!(!checker.check_all(&files));
    assert!(checker.has_failed());
    assert_eq!(checker.session().accumulated().lines().count(), 2);
}

#[test]
fn warning_mode_suppresses_header() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing.csv");
    let mut session = session().with_print(true);
    let mut checker = FileChecker::new(&CsvWorkbookSource, &mut session);
    checker.file_exists(&path);

    let mut out = Vec::new();
    session.report_to(&mut out).expect("report");
    // Warnings are reset after reporting, so nothing is pending
    assert!(out.is_empty());
    assert!(!session.accumulated().contains("fatal error"));
}
