//! Error-code lookup and message composition.
//!
//! A [`ErrorRegistry`] holds the read-only code table. Each validation pass
//! owns an [`ErrorSession`] that stages failures, resolves them to messages
//! through the registry, and accumulates everything it reported.
//!
//! ```
//! use std::sync::Arc;
//! use preflight_errors::{ErrorRegistry, ErrorSession};
//!
//! let codes = "iCode,Class,Locn,Msg_String\n\
//!              100,Demo,check1,Base\n\
//!              101,Demo,check1,A check1 error occurred\n";
//! let registry = Arc::new(ErrorRegistry::from_reader(codes.as_bytes()).unwrap());
//! let mut session = ErrorSession::new(registry).with_print(false);
//!
//! if session.mark_failure(true, 1, Some("check1"), None) {
//!     session.record();
//! }
//! assert_eq!(session.accumulated(), "A check1 error occurred");
//! ```

mod error;
mod registry;
mod session;

pub use error::{CodeTableError, Result};
pub use registry::{BASE_CODE_NOT_FOUND, CodeTable, EntryKind, ErrorCodeEntry, ErrorRegistry};
pub use session::{ErrorSession, ErrorState, REPORT_CODE_UNSET};
