//! The phase coordinator

use std::sync::Arc;

use pva_complete::{CompletionEngine, CompletionOptions};
use pva_explore::{ExplorationEngine, ExplorationOptions};
use pva_plan::PlanningEngine;
use pva_report::{CompletionReport, ExplorationReport, Phase, PlanningReport};
use pva_tools::ToolInvoker;

use crate::ledger::PhaseLedger;

/// Pipeline-level knobs
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Options forwarded to every exploration call
    pub exploration: ExplorationOptions,
    /// Options forwarded to the completion call
    pub completion: CompletionOptions,
    /// How many explore↔plan back-edges the pipeline will follow
    ///
    /// The engines themselves never bound the loop; the budget lives here.
    pub max_replans: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            exploration: ExplorationOptions::default(),
            completion: CompletionOptions::default(),
            max_replans: 3,
        }
    }
}

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// The exploration report the plan was built from
    pub exploration: ExplorationReport,
    /// The final planning report
    pub planning: PlanningReport,
    /// The completion report, when planning advanced that far
    pub completion: Option<CompletionReport>,
    /// How many back-edges were followed
    pub replans_used: usize,
}

/// Sequences the three engines and keeps per-phase history
///
/// One coordinator serializes one pipeline at a time; run several
/// coordinators for parallel pipelines — their ledgers are independent.
pub struct PhaseCoordinator {
    explorer: ExplorationEngine,
    planner: PlanningEngine,
    completer: CompletionEngine,
    /// History of exploration reports
    pub explorations: PhaseLedger<ExplorationReport>,
    /// History of planning reports
    pub plannings: PhaseLedger<PlanningReport>,
    /// History of completion reports
    pub completions: PhaseLedger<CompletionReport>,
}

impl PhaseCoordinator {
    /// Build a coordinator over one tool boundary
    #[must_use]
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            explorer: ExplorationEngine::new(Arc::clone(&invoker)),
            planner: PlanningEngine::new(),
            completer: CompletionEngine::new(invoker),
            explorations: PhaseLedger::new(),
            plannings: PhaseLedger::new(),
            completions: PhaseLedger::new(),
        }
    }

    /// Run the exploration phase and record the report
    pub async fn explore(
        &self,
        dir: &str,
        vision: &str,
        options: &ExplorationOptions,
    ) -> ExplorationReport {
        let report = self.explorer.execute(dir, vision, options).await;
        self.explorations.push(report.clone());
        report
    }

    /// Run the planning phase and record the report
    pub fn plan(
        &self,
        dir: &str,
        vision: &str,
        exploration: &ExplorationReport,
    ) -> PlanningReport {
        let report = self.planner.execute(dir, vision, exploration);
        self.plannings.push(report.clone());
        report
    }

    /// Run the completion phase and record the report
    pub async fn complete(
        &self,
        dir: &str,
        vision: &str,
        exploration: Option<&ExplorationReport>,
        planning: Option<&PlanningReport>,
        options: &CompletionOptions,
    ) -> CompletionReport {
        let report = self
            .completer
            .execute(dir, vision, exploration, planning, options)
            .await;
        self.completions.push(report.clone());
        report
    }

    /// Run the whole pipeline, honoring back-edges up to the replan budget
    ///
    /// When the budget is exhausted the pipeline proceeds with the best
    /// reports it has; completion only runs if planning advanced to it.
    pub async fn run_pipeline(
        &self,
        dir: &str,
        vision: &str,
        config: &CoordinatorConfig,
    ) -> PipelineOutcome {
        let mut replans_used = 0usize;
        let mut exploration = self.explore(dir, vision, &config.exploration).await;

        while exploration.next_phase == Phase::Explore && replans_used < config.max_replans {
            replans_used += 1;
            tracing::info!(replans_used, "exploration asked to re-explore");
            exploration = self.explore(dir, vision, &config.exploration).await;
        }

        let mut planning = self.plan(dir, vision, &exploration);
        while planning.next_phase == Phase::Explore && replans_used < config.max_replans {
            replans_used += 1;
            tracing::info!(replans_used, "planning sent the pipeline back to exploration");
            exploration = self.explore(dir, vision, &config.exploration).await;
            planning = self.plan(dir, vision, &exploration);
        }

        let completion = if planning.next_phase == Phase::Complete {
            Some(
                self.complete(dir, vision, Some(&exploration), Some(&planning), &config.completion)
                    .await,
            )
        } else {
            tracing::warn!("replan budget exhausted before planning advanced; stopping early");
            None
        };

        PipelineOutcome {
            exploration,
            planning,
            completion,
            replans_used,
        }
    }

    /// Drop all per-phase history
    pub fn clear_history(&self) {
        self.explorations.clear();
        self.plannings.clear();
        self.completions.clear();
    }
}
