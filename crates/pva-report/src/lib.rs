//! Shared data model for the PVA phase engines
//!
//! Every phase engine consumes and produces the types defined here:
//! - Phase identifiers and report ids
//! - Exploration, planning and completion reports
//! - Implementation steps, validation rules, risks and healing actions
//!
//! Reports are immutable once created: engines build them, append them to a
//! ledger, and pass them downstream by value. Nothing in this crate mutates
//! a report after construction.

pub mod completion;
pub mod exploration;
pub mod healing;
pub mod phase;
pub mod plan;

pub use completion::{
    CompletionError, CompletionReport, DeploymentRecord, ValidationResult,
};
pub use exploration::{
    CheckCategory, ExplorationReport, HealingSummary, ValidationCheck, ValidationSummary,
    MAX_KEY_FILES, MAX_REQUIREMENTS,
};
pub use healing::{HealingAction, HealingKind};
pub use phase::{clamp_confidence, clamp_confidence_floor, Phase, ReportId};
pub use plan::{
    Complexity, DependencySet, FailureAction, FileStructure, ImplementationStep, PlanningReport,
    Risk, RiskCategory, RiskLevel, RiskOwner, StepComplexity, StepPhase, StepPriority,
    TechCategory, TechChoice, ValidationKind, ValidationRule, MAX_FEATURES,
};
