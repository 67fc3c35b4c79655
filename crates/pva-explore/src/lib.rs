//! Exploration phase engine
//!
//! Surveys a working directory and a free-text vision, and derives a
//! structured [`pva_report::ExplorationReport`]: ranked key files, detected
//! technologies, captured requirements and a confidence score that decides
//! whether the pipeline may advance to planning.
//!
//! The engine never returns an error: every failure mode — unreachable
//! tools, malformed results, internal defects — degrades the report instead.

mod checkup;
mod engine;
mod survey;

pub use engine::{ExplorationEngine, ExplorationOptions};
