//! Completion phase engine
//!
//! Executes an implementation plan through the tool boundary: writes
//! deliverables, runs the validation battery, heals categorized failures
//! once, optionally runs test probes, commits and records a stubbed
//! deployment. Produces a [`pva_report::CompletionReport`].
//!
//! Per-step failures never abort the remaining steps, and nothing escapes
//! `execute` as an error.

mod engine;
mod steps;
mod verify;

pub use engine::{CompletionEngine, CompletionOptions};
