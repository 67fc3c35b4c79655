//! The planning engine

use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::Utc;
use pva_graph::StepGraph;
use pva_heuristics::{
    complexity_score, extract_features, extract_integrations, extract_non_functional,
    ExplorationRichness,
};
use pva_report::{
    clamp_confidence_floor, Complexity, ExplorationReport, ImplementationStep, Phase,
    PlanningReport, ReportId, RiskLevel, TechCategory,
};

use crate::{blueprint, stack};

/// Confidence floor below which the pipeline loops back to exploration
const ADVANCE_THRESHOLD: f64 = 0.4;

/// Turns a vision plus exploration evidence into an ordered plan
///
/// The planner is pure: no tool calls, no I/O, no state between runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlanningEngine;

impl PlanningEngine {
    /// Create a planner
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run the planning phase
    ///
    /// Never fails: structural defects and internal errors both yield a
    /// `success=false` report with a recorded technical risk.
    #[must_use]
    pub fn execute(
        &self,
        dir: &str,
        vision: &str,
        exploration: &ExplorationReport,
    ) -> PlanningReport {
        tracing::info!(dir, "planning started");
        match catch_unwind(AssertUnwindSafe(|| run(vision, exploration))) {
            Ok(report) => report,
            Err(_) => {
                tracing::error!("planning aborted unexpectedly, emitting failed report");
                PlanningReport::failed("planning aborted unexpectedly")
            }
        }
    }
}

fn classify(score: u32) -> Complexity {
    match score {
        0..=1 => Complexity::Simple,
        2..=3 => Complexity::Moderate,
        _ => Complexity::Complex,
    }
}

fn run(vision: &str, exploration: &ExplorationReport) -> PlanningReport {
    let features = extract_features(vision);
    let non_functional = extract_non_functional(vision);
    let integrations = extract_integrations(vision);

    let richness = ExplorationRichness {
        technologies: exploration.technologies.len(),
        key_files: exploration.key_files.len(),
    };
    let complexity = classify(complexity_score(vision, richness));

    let tech_stack = stack::choose_stack(&exploration.technologies);
    let language = tech_stack
        .iter()
        .find(|c| c.category == TechCategory::Language)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "javascript".to_string());

    let file_structure = blueprint::file_structure(&language);
    let dependencies = blueprint::resolve_dependencies(&tech_stack);
    let plan = blueprint::build_plan(&features, complexity, &language);

    // Validate and order the plan through the shared graph; a structural
    // defect is a planning failure, not a crash.
    let pairs: Vec<(String, Vec<String>)> = plan
        .iter()
        .map(|s| (s.id.clone(), s.dependencies.clone()))
        .collect();
    let graph = match StepGraph::build(&pairs) {
        Ok(graph) => graph,
        Err(err) => {
            tracing::warn!(error = %err, "implementation plan is structurally invalid");
            return PlanningReport::failed(err.to_string());
        }
    };
    let order = graph.scheduled_order(|idx| plan[idx].priority.weight());
    let implementation_plan: Vec<ImplementationStep> = order
        .iter()
        .filter_map(|id| plan.iter().find(|s| &s.id == id).cloned())
        .collect();

    let validation_criteria = blueprint::validation_rules(&language);
    let risks = blueprint::assess_risks(&tech_stack, &implementation_plan);

    let average = tech_stack.iter().map(|c| c.confidence).sum::<f64>() / tech_stack.len() as f64;
    let high_impact = risks.iter().filter(|r| r.impact == RiskLevel::High).count() as f64;
    let mut confidence = 0.5 + 0.3 * (average - 0.5) - 0.1 * high_impact;
    if exploration.confidence > 0.7 {
        confidence += 0.2;
    }
    let confidence = clamp_confidence_floor(confidence);

    let next_phase = if confidence < ADVANCE_THRESHOLD {
        Phase::Explore
    } else {
        Phase::Complete
    };

    tracing::info!(
        ?complexity,
        steps = implementation_plan.len(),
        confidence,
        next = %next_phase,
        "planning finished"
    );

    PlanningReport {
        id: ReportId::new(),
        created_at: Utc::now(),
        success: true,
        complexity,
        features,
        non_functional,
        integrations,
        tech_stack,
        file_structure,
        dependencies,
        implementation_plan,
        validation_criteria,
        risks,
        confidence,
        next_phase,
    }
}
