//! Planning phase engine
//!
//! Consumes the vision and an exploration report and produces a
//! [`pva_report::PlanningReport`]: a chosen stack, a conventional file
//! layout, statically resolved dependencies, a dependency-ordered
//! implementation plan, validation rules and risks.
//!
//! Everything in this crate is deterministic table lookups and pure
//! heuristics; the planner performs no tool calls.

mod blueprint;
mod engine;
mod stack;

pub use engine::PlanningEngine;
