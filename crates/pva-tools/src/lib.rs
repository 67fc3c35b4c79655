//! Tool invocation boundary
//!
//! All side effects of the phase engines — file I/O, shell, version control,
//! search, validation — flow through the single [`ToolInvoker`] trait defined
//! here. Engines never open sockets, files or processes themselves.
//!
//! The boundary speaks a `{success, result?, error?}` envelope
//! ([`ToolOutcome`]); failures are data, not panics, so a timed-out or
//! unavailable tool degrades the calling phase instead of aborting it.

pub mod invoker;
pub mod parse;

pub use invoker::{ToolError, ToolInvoker, ToolName, ToolOutcome, Tools};
pub use parse::{parse_validation_output, ParsedValidation};
