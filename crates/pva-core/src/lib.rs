//! Phase coordination for the PVA pipeline
//!
//! The [`PhaseCoordinator`] sequences the three engines over one tool
//! boundary, forwards each report downstream by value, honors the
//! explore↔plan back-edge under a bounded replan budget, and appends every
//! report to a per-phase [`PhaseLedger`].

mod coordinator;
mod ledger;
pub mod logging;

pub use coordinator::{CoordinatorConfig, PhaseCoordinator, PipelineOutcome};
pub use ledger::PhaseLedger;

/// Commonly used types for driving a pipeline
pub mod prelude {
    pub use crate::{CoordinatorConfig, PhaseCoordinator, PipelineOutcome};
    pub use pva_complete::{CompletionEngine, CompletionOptions};
    pub use pva_explore::{ExplorationEngine, ExplorationOptions};
    pub use pva_plan::PlanningEngine;
    pub use pva_report::{CompletionReport, ExplorationReport, Phase, PlanningReport};
    pub use pva_tools::{ToolInvoker, ToolName, ToolOutcome};
}
