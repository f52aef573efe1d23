//! Per-pass error session.
//!
//! An [`ErrorSession`] is the mutable half of error handling: checks stage a
//! failure with [`ErrorSession::mark_failure`] and then call
//! [`ErrorSession::record`], which resolves the codes, composes the message,
//! reports it, and (for warnings) resets the transient state so the next
//! check starts clean.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::registry::{BASE_CODE_NOT_FOUND, ErrorRegistry};

/// Report code value meaning "not computed".
pub const REPORT_CODE_UNSET: i64 = 0;

/// Mutable state carried across one validation pass.
#[derive(Debug, Clone)]
pub struct ErrorState {
    /// Location key used for the base-code lookup.
    pub location: String,
    pub local_code: i64,
    pub base_code: i64,
    /// `base_code + local_code`; [`REPORT_CODE_UNSET`] when the base lookup failed.
    pub report_code: i64,
    /// Appended to the message as `": {param}"`.
    pub optional_param: Option<String>,
    /// Printed once before the first fatal message.
    pub header: String,
    pub current_message: String,
    /// A failure was marked and its message has not been composed yet.
    pub is_new_error: bool,
    pub has_error: bool,
    pub is_warning: bool,
    /// Newline-joined log of every reported message; never reset by warnings.
    pub accumulated_messages: String,
    pub print_enabled: bool,
    pub log_enabled: bool,
    reported_len: usize,
    header_emitted: bool,
}

impl Default for ErrorState {
    fn default() -> Self {
        Self {
            location: String::new(),
            local_code: 0,
            base_code: 0,
            report_code: REPORT_CODE_UNSET,
            optional_param: None,
            header: String::new(),
            current_message: String::new(),
            is_new_error: false,
            has_error: false,
            is_warning: false,
            accumulated_messages: String::new(),
            print_enabled: true,
            log_enabled: false,
            reported_len: 0,
            header_emitted: false,
        }
    }
}

/// Caller-owned error session bound to a shared registry.
#[derive(Debug, Clone)]
pub struct ErrorSession {
    registry: Arc<ErrorRegistry>,
    state: ErrorState,
}

impl ErrorSession {
    pub fn new(registry: Arc<ErrorRegistry>) -> Self {
        Self {
            registry,
            state: ErrorState::default(),
        }
    }

    /// Set the header printed before fatal messages.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.state.header = header.into();
        self
    }

    /// Treat failures as warnings (reported then reset).
    #[must_use]
    pub fn with_warning(mut self, enable: bool) -> Self {
        self.state.is_warning = enable;
        self
    }

    /// Enable or disable printing to standard output.
    #[must_use]
    pub fn with_print(mut self, enable: bool) -> Self {
        self.state.print_enabled = enable;
        self
    }

    /// Enable or disable mirroring messages to the `tracing` error sink.
    #[must_use]
    pub fn with_log(mut self, enable: bool) -> Self {
        self.state.log_enabled = enable;
        self
    }

    pub fn registry(&self) -> &ErrorRegistry {
        &self.registry
    }

    pub fn state(&self) -> &ErrorState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ErrorState {
        &mut self.state
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.state.location = location.into();
    }

    pub fn set_warning(&mut self, enable: bool) {
        self.state.is_warning = enable;
    }

    pub fn set_print(&mut self, enable: bool) {
        self.state.print_enabled = enable;
    }

    pub fn has_error(&self) -> bool {
        self.state.has_error
    }

    pub fn is_warning(&self) -> bool {
        self.state.is_warning
    }

    /// Every message reported so far in this session.
    pub fn accumulated(&self) -> &str {
        &self.state.accumulated_messages
    }

    /// Return the accumulated log and start a fresh one.
    pub fn take_accumulated(&mut self) -> String {
        std::mem::take(&mut self.state.accumulated_messages)
    }

    /// Stage a failure when `condition` holds.
    ///
    /// Returns `condition`. Nothing is mutated when it is false, so call sites
    /// read `if session.mark_failure(..) { session.record() }`.
    ///
    /// A `None` param keeps the previous failure's param; in a fatal session
    /// that param is appended to the next message too.
    pub fn mark_failure(
        &mut self,
        condition: bool,
        local_code: i64,
        location: Option<&str>,
        param: Option<String>,
    ) -> bool {
        if !condition {
            return false;
        }
        if let Some(location) = location {
            self.state.location = location.to_string();
        }
        self.state.has_error = true;
        self.state.is_new_error = true;
        self.state.local_code = local_code;
        if param.is_some() {
            self.state.optional_param = param;
        }
        true
    }

    /// Resolve, compose, report, and reset if the session runs as warnings.
    pub fn record(&mut self) {
        self.resolve_codes();
        self.compose_message();
        self.report();
        if self.state.is_warning {
            self.reset_warning();
        }
    }

    /// Look up the base code and compute the report code.
    ///
    /// Returns false when the location has no base row; the report code is
    /// then reset to [`REPORT_CODE_UNSET`] instead of keeping a stale value.
    pub fn resolve_codes(&mut self) -> bool {
        let state = &mut self.state;
        state.base_code = self.registry.resolve_base_code(&state.location);
        let report_code = self
            .registry
            .compute_report_code(state.base_code, state.local_code);
        state.report_code = report_code.unwrap_or(REPORT_CODE_UNSET);
        debug!(
            location = %state.location,
            local_code = state.local_code,
            base_code = state.base_code,
            report_code = state.report_code,
            "resolved error codes"
        );
        report_code.is_some()
    }

    /// Append the message for the staged failure to `current_message`.
    ///
    /// A no-op unless a fresh failure was marked since the last composition.
    pub fn compose_message(&mut self) -> &str {
        let state = &mut self.state;
        if !state.is_new_error {
            return &state.current_message;
        }
        let text = self
            .registry
            .message_for(&state.location, state.base_code, state.report_code);
        if !state.current_message.is_empty() {
            state.current_message.push('\n');
        }
        state.current_message.push_str(&text);
        if let Some(param) = &state.optional_param {
            state.current_message.push_str(": ");
            state.current_message.push_str(param);
        }
        state.is_new_error = false;
        &state.current_message
    }

    /// Report unreported message text to standard output and the log sink.
    pub fn report(&mut self) {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        if let Err(error) = self.report_to(&mut out) {
            warn!(%error, "failed to write validation message");
        }
    }

    /// Report unreported message text to `out` and the log sink.
    ///
    /// Only text composed since the last report is appended to the
    /// accumulated log, so a fatal session that keeps its message does not
    /// duplicate earlier failures.
    pub fn report_to<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let state = &mut self.state;
        let fresh = state
            .current_message
            .get(state.reported_len..)
            .unwrap_or(&state.current_message)
            .trim_start_matches('\n');
        if fresh.is_empty() {
            return Ok(());
        }
        let fresh = fresh.to_string();
        state.reported_len = state.current_message.len();

        if !state.accumulated_messages.is_empty() {
            state.accumulated_messages.push('\n');
        }
        state.accumulated_messages.push_str(&fresh);

        let emit_header = !state.header.is_empty()
            && !state.is_warning
            && !state.header_emitted
            && (state.print_enabled || state.log_enabled);
        if emit_header {
            state.header_emitted = true;
        }

        if state.log_enabled {
            if emit_header {
                error!(location = %state.location, "{}", state.header);
            }
            error!(
                location = %state.location,
                code = state.report_code,
                "{fresh}"
            );
        }
        if state.print_enabled {
            if emit_header {
                writeln!(out, "{}", state.header)?;
            }
            writeln!(out, "{fresh}")?;
        }
        Ok(())
    }

    /// Return transient fields to their defaults after a warning.
    pub fn reset_warning(&mut self) {
        let state = &mut self.state;
        state.local_code = 0;
        state.base_code = 0;
        state.report_code = REPORT_CODE_UNSET;
        state.current_message.clear();
        state.optional_param = None;
        state.has_error = false;
        state.reported_len = 0;
    }

    /// True when the staged location has no base row.
    pub fn base_missing(&self) -> bool {
        self.state.base_code == BASE_CODE_NOT_FOUND
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ErrorCodeEntry;

    fn session() -> ErrorSession {
        let registry = ErrorRegistry::load([
            ErrorCodeEntry::base(100, "DemoClass", "check1"),
            ErrorCodeEntry::message(101, "DemoClass", "check1", "A check1 error occurred"),
            ErrorCodeEntry::message(102, "DemoClass", "check1", "Another check1 error"),
        ]);
        ErrorSession::new(Arc::new(registry)).with_print(false)
    }

    #[test]
    fn test_mark_failure_false_leaves_state() {
        let mut session = session();
        assert!(!session.mark_failure(false, 1, Some("check1"), Some("p".into())));
        assert_eq!(session.state().local_code, 0);
        assert_eq!(session.state().optional_param, None);
        assert_eq!(session.state().location, "");
        assert!(!session.has_error());
    }

    #[test]
    fn test_mark_failure_sets_state() {
        let mut session = session();
        assert!(session.mark_failure(true, 1, None, Some("test_param".into())));
        assert_eq!(session.state().local_code, 1);
        assert_eq!(session.state().optional_param.as_deref(), Some("test_param"));
        assert!(session.has_error());
        assert!(session.state().is_new_error);
    }

    #[test]
    fn test_resolve_codes() {
        let mut session = session();
        session.mark_failure(true, 1, Some("check1"), None);
        assert!(session.resolve_codes());
        assert_eq!(session.state().base_code, 100);
        assert_eq!(session.state().report_code, 101);

        session.mark_failure(true, 1, Some("check_no_base"), None);
        assert!(!session.resolve_codes());
        assert_eq!(session.state().base_code, BASE_CODE_NOT_FOUND);
        assert_eq!(session.state().report_code, REPORT_CODE_UNSET);
        assert!(session.base_missing());
    }

    #[test]
    fn test_compose_appends_with_newline() {
        let mut session = session();
        session.state_mut().current_message = "Pre-existing".to_string();
        session.mark_failure(true, 1, Some("check1"), None);
        session.resolve_codes();
        assert_eq!(
            session.compose_message(),
            "Pre-existing\nA check1 error occurred"
        );
    }

    #[test]
    fn test_compose_is_noop_without_fresh_failure() {
        let mut session = session();
        session.mark_failure(true, 1, Some("check1"), Some("col_2".into()));
        session.resolve_codes();
        let first = session.compose_message().to_string();
        let second = session.compose_message().to_string();
        assert_eq!(first, "A check1 error occurred: col_2");
        assert_eq!(first, second);
    }

    #[test]
    fn test_report_skips_empty_message() {
        let mut session = session();
        let mut out = Vec::new();
        session.report_to(&mut out).expect("report");
        assert!(out.is_empty());
        assert_eq!(session.accumulated(), "");
    }

    #[test]
    fn test_warning_resets_after_record() {
        let mut session = session().with_warning(true);
        session.mark_failure(true, 1, Some("check1"), Some("x".into()));
        session.record();
        let state = session.state();
        assert_eq!(state.local_code, 0);
        assert_eq!(state.base_code, 0);
        assert_eq!(state.report_code, 0);
        assert_eq!(state.current_message, "");
        assert_eq!(state.optional_param, None);
        assert!(!state.has_error);
        assert_eq!(session.accumulated(), "A check1 error occurred: x");
    }

    #[test]
    fn test_fatal_keeps_state() {
        let mut session = session();
        session.mark_failure(true, 2, Some("check1"), None);
        session.record();
        assert!(session.has_error());
        assert_eq!(session.state().report_code, 102);
        assert_eq!(session.state().current_message, "Another check1 error");
    }

    #[test]
    fn test_take_accumulated() {
        let mut session = session().with_warning(true);
        session.mark_failure(true, 1, Some("check1"), None);
        session.record();
        assert_eq!(session.take_accumulated(), "A check1 error occurred");
        assert_eq!(session.accumulated(), "");
    }
}
