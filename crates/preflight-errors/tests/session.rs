//! Integration tests for code resolution and the session lifecycle.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use preflight_errors::{
    BASE_CODE_NOT_FOUND, ErrorCodeEntry, ErrorRegistry, ErrorSession, REPORT_CODE_UNSET,
};
use proptest::prelude::*;

const CODES: &str = "
iCode,Class,Locn,Msg_String
100,CheckExcelFiles,CheckFilesProcedure,Base
101,CheckExcelFiles,CheckFilesProcedure,ERROR: Input file not found
102,CheckExcelFiles,CheckFilesProcedure,ERROR: Input file not a valid Excel file
103,CheckExcelFiles,CheckFilesProcedure,ERROR: Required input file sheet not found
";

const HEADER: &str = "The program encountered the following fatal error:";

fn registry() -> Arc<ErrorRegistry> {
    Arc::new(ErrorRegistry::from_reader(CODES.as_bytes()).expect("codes"))
}

/// Writer collecting formatted log lines in memory.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        let bytes = self.0.lock().expect("log lock").clone();
        String::from_utf8(bytes).expect("utf8")
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber writing into a fresh capture; return the log text.
fn capture_log(f: impl FnOnce()) -> String {
    let capture = LogCapture::default();
    let writer = capture.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    capture.contents()
}

fn logging_session() -> ErrorSession {
    ErrorSession::new(registry())
        .with_header(HEADER)
        .with_print(false)
        .with_log(true)
}

fn quiet_session() -> ErrorSession {
    ErrorSession::new(registry()).with_print(false)
}

#[test]
fn missing_location_degrades_to_base_fallback() {
    let mut session = quiet_session();
    assert_eq!(session.registry().resolve_base_code("nowhere"), BASE_CODE_NOT_FOUND);

    session.mark_failure(true, 1, Some("nowhere"), None);
    session.resolve_codes();
    assert_eq!(
        session.compose_message(),
        "Base error code not found for function: nowhere"
    );
}

#[test]
fn missing_report_code_degrades_to_code_fallback() {
    let mut session = quiet_session();
    session.mark_failure(true, 9, Some("CheckFilesProcedure"), None);
    session.record();
    assert_eq!(
        session.accumulated(),
        "Error code not found for CheckFilesProcedure: 109"
    );
}

#[test]
fn base_failure_after_success_does_not_reuse_report_code() {
    let mut session = quiet_session();
    session.mark_failure(true, 1, Some("CheckFilesProcedure"), None);
    assert!(session.resolve_codes());
    assert_eq!(session.state().report_code, 101);

    session.mark_failure(true, 1, Some("unknown"), None);
    assert!(!session.resolve_codes());
    assert_eq!(session.state().report_code, REPORT_CODE_UNSET);
}

#[test]
fn warning_record_resets_but_keeps_log() {
    let mut session = quiet_session().with_warning(true);
    session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a.xlsx".into()));
    session.record();

    let state = session.state();
    assert_eq!(
        (state.local_code, state.base_code, state.report_code),
        (0, 0, 0)
    );
    assert_eq!(state.current_message, "");
    assert!(!state.has_error);
    assert_eq!(
        session.accumulated(),
        "ERROR: Input file not found: a.xlsx"
    );
}

#[test]
fn consecutive_fatal_failures_accumulate_once_each() {
    let mut session = quiet_session();
    session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a.xlsx".into()));
    session.record();
    session.mark_failure(true, 3, Some("CheckFilesProcedure"), Some("Missing: s".into()));
    session.record();

    assert_eq!(
        session.accumulated(),
        "ERROR: Input file not found: a.xlsx\n\
         ERROR: Required input file sheet not found: Missing: s"
    );
    assert!(session.has_error());
}

#[test]
fn repeated_record_without_new_failure_adds_nothing() {
    let mut session = quiet_session();
    session.mark_failure(true, 2, Some("CheckFilesProcedure"), None);
    session.record();
    session.record();
    assert_eq!(
        session.accumulated(),
        "ERROR: Input file not a valid Excel file"
    );
}

#[test]
fn header_printed_once_for_fatal_errors() {
    let mut session = ErrorSession::new(registry()).with_header(HEADER);
    let mut out = Vec::new();

    session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a".into()));
    session.resolve_codes();
    session.compose_message();
    session.report_to(&mut out).expect("report");

    session.mark_failure(true, 2, Some("CheckFilesProcedure"), Some("b".into()));
    session.resolve_codes();
    session.compose_message();
    session.report_to(&mut out).expect("report");

    let printed = String::from_utf8(out).expect("utf8");
    insta::assert_snapshot!(printed.trim_end(), @r"
    The program encountered the following fatal error:
    ERROR: Input file not found: a
    ERROR: Input file not a valid Excel file: b
    ");
}

#[test]
fn header_suppressed_for_warnings() {
    let mut session = ErrorSession::new(registry())
        .with_header(HEADER)
        .with_warning(true);
    let mut out = Vec::new();

    session.mark_failure(true, 1, Some("CheckFilesProcedure"), None);
    session.resolve_codes();
    session.compose_message();
    session.report_to(&mut out).expect("report");

    assert_eq!(
        String::from_utf8(out).expect("utf8"),
        "ERROR: Input file not found\n"
    );
}

#[test]
fn print_disabled_writes_nothing() {
    let mut session = quiet_session().with_header(HEADER);
    let mut out = Vec::new();
    session.mark_failure(true, 1, Some("CheckFilesProcedure"), None);
    session.resolve_codes();
    session.compose_message();
    session.report_to(&mut out).expect("report");
    assert!(out.is_empty());
    assert_eq!(session.accumulated(), "ERROR: Input file not found");
}

#[test]
fn load_from_path() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(CODES.as_bytes()).expect("write codes");
    let registry = ErrorRegistry::from_path(file.path()).expect("load");
    assert_eq!(registry.table().len(), 4);
    assert_eq!(registry.resolve_base_code("CheckFilesProcedure"), 100);
}

#[test]
fn load_from_missing_path_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = ErrorRegistry::from_path(&dir.path().join("missing.csv"));
    assert!(result.is_err());
}

#[test]
fn log_sink_receives_header_and_message() {
    let mut session = logging_session();
    let log = capture_log(|| {
        session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a.xlsx".into()));
        session.record();
    });
    assert!(log.contains(HEADER), "{log}");
    assert!(log.contains("ERROR: Input file not found: a.xlsx"), "{log}");
    assert_eq!(session.accumulated(), "ERROR: Input file not found: a.xlsx");
}

#[test]
fn log_sink_omits_header_for_warnings() {
    let mut session = logging_session().with_warning(true);
    let log = capture_log(|| {
        session.mark_failure(true, 2, Some("CheckFilesProcedure"), Some("b.txt".into()));
        session.record();
    });
    assert!(!log.contains(HEADER), "{log}");
    assert!(log.contains("ERROR: Input file not a valid Excel file: b.txt"), "{log}");
}

#[test]
fn log_sink_header_once_across_fatal_reports() {
    let mut session = logging_session();
    let log = capture_log(|| {
        session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a".into()));
        session.record();
        session.mark_failure(true, 2, Some("CheckFilesProcedure"), Some("b".into()));
        session.record();
    });
    assert_eq!(log.matches(HEADER).count(), 1, "{log}");
    assert!(log.contains("ERROR: Input file not found: a"), "{log}");
    assert!(log.contains("ERROR: Input file not a valid Excel file: b"), "{log}");
}

#[test]
fn fatal_failure_without_param_keeps_previous_param() {
    let mut session = quiet_session();
    session.mark_failure(true, 1, Some("CheckFilesProcedure"), Some("a.xlsx".into()));
    session.record();
    session.mark_failure(true, 2, Some("CheckFilesProcedure"), None);
    session.record();
    assert_eq!(
        session.accumulated(),
        "ERROR: Input file not found: a.xlsx\n\
         ERROR: Input file not a valid Excel file: a.xlsx"
    );
}

proptest! {
    #[test]
    fn resolution_yields_base_plus_local(
        base in 1i64..9_000,
        local in 0i64..100,
        location in "[a-z][a-z0-9_]{0,12}",
        text in "[A-Za-z][A-Za-z ]{0,30}",
    ) {
        let registry = ErrorRegistry::load([
            ErrorCodeEntry::base(base, "Prop", location.clone()),
            ErrorCodeEntry::message(base + local, "Prop", location.clone(), text.clone()),
        ]);
        let mut session = ErrorSession::new(Arc::new(registry)).with_print(false);
        session.mark_failure(true, local, Some(&location), None);
        session.record();
        prop_assert_eq!(session.state().report_code, base + local);
        prop_assert_eq!(session.accumulated(), text.as_str());
    }
}
