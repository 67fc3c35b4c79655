//! End-to-end pipeline behavior over a scripted tool boundary

use std::sync::Arc;

use pretty_assertions::assert_eq;
use pva_core::prelude::*;
use pva_test_utils::ScriptedInvoker;
use serde_json::json;

fn coordinator(invoker: &Arc<ScriptedInvoker>) -> PhaseCoordinator {
    PhaseCoordinator::new(Arc::clone(invoker) as Arc<dyn ToolInvoker>)
}

fn scripted_project(invoker: &ScriptedInvoker) {
    invoker.respond(
        ToolName::GetProjectTree,
        ToolOutcome::ok(json!({
            "files": [
                "package.json",
                "tsconfig.json",
                "src/index.ts",
                "README.md",
                "tests/app.test.ts",
            ]
        })),
    );
    invoker.respond(
        ToolName::ReadFiles,
        ToolOutcome::ok(json!({"files": [{"path": "package.json", "content": "{}"}]})),
    );
    invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
    invoker.respond(ToolName::RunCommand, ToolOutcome::ok(json!({"stdout": "ok"})));
}

#[tokio::test]
async fn pipeline_runs_all_three_phases_on_a_rich_project() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);
    let coordinator = coordinator(&invoker);

    let outcome = coordinator
        .run_pipeline(
            "/proj",
            "We need user authentication. Add csv export.",
            &CoordinatorConfig::default(),
        )
        .await;

    assert_eq!(outcome.replans_used, 0);
    assert_eq!(outcome.exploration.next_phase, Phase::Plan);
    assert_eq!(outcome.planning.next_phase, Phase::Complete);
    let completion = outcome.completion.expect("completion ran");
    assert!(completion.success);
    assert!(completion.files_touched() >= 1);

    assert_eq!(coordinator.explorations.len(), 1);
    assert_eq!(coordinator.plannings.len(), 1);
    assert_eq!(coordinator.completions.len(), 1);
}

#[tokio::test]
async fn empty_directory_with_scaffold_vision() {
    // Scenario: brand-new project, the vision only asks for scaffolding
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.respond(ToolName::GetProjectTree, ToolOutcome::ok(json!({"files": []})));
    invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
    let coordinator = coordinator(&invoker);

    let outcome = coordinator
        .run_pipeline(
            "/proj/new",
            "Add a README and package.json",
            &CoordinatorConfig::default(),
        )
        .await;

    // One captured requirement, nothing else: confidence sits mid-range
    assert!(outcome.exploration.confidence >= 0.3);
    assert!(outcome.exploration.confidence <= 0.5);

    let setup = &outcome.planning.implementation_plan[0];
    assert_eq!(setup.id, "setup");
    assert!(setup.deliverables.contains(&"README.md".to_string()));
    assert!(setup.deliverables.contains(&"package.json".to_string()));

    let completion = outcome.completion.expect("completion ran");
    assert!(completion.files_created.contains(&"README.md".to_string()));
    assert!(completion.files_created.contains(&"package.json".to_string()));
}

#[tokio::test]
async fn replan_budget_bounds_the_back_edge() {
    // Structure probe always fails: exploration keeps asking to re-explore
    let invoker = Arc::new(ScriptedInvoker::new());
    invoker.respond(ToolName::GetProjectTree, ToolOutcome::err("unreachable"));
    invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
    let coordinator = coordinator(&invoker);

    let config = CoordinatorConfig {
        max_replans: 2,
        ..CoordinatorConfig::default()
    };
    let outcome = coordinator
        .run_pipeline("/proj", "just a plain description", &config)
        .await;

    assert_eq!(outcome.replans_used, 2);
    // Budget spent: the pipeline proceeds with what it has
    assert_eq!(coordinator.explorations.len(), 3);
    assert_eq!(coordinator.plannings.len(), 1);
    assert!(outcome.completion.is_some());
}

#[tokio::test]
async fn dry_run_pipeline_never_writes() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);
    let coordinator = coordinator(&invoker);

    let config = CoordinatorConfig {
        completion: CompletionOptions {
            dry_run: true,
            ..CompletionOptions::default()
        },
        ..CoordinatorConfig::default()
    };
    let outcome = coordinator
        .run_pipeline("/proj", "We need user authentication", &config)
        .await;

    let completion = outcome.completion.expect("completion ran");
    assert!(completion.success);
    assert!(completion.files_created.is_empty());
    assert_eq!(invoker.calls(ToolName::WriteFiles), 0);
    assert_eq!(invoker.calls(ToolName::GitOperation), 0);
}

#[tokio::test]
async fn zero_file_reads_still_complete_the_pipeline() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);
    let coordinator = coordinator(&invoker);

    let config = CoordinatorConfig {
        exploration: ExplorationOptions {
            max_files_to_read: 0,
            ..ExplorationOptions::default()
        },
        ..CoordinatorConfig::default()
    };
    let outcome = coordinator
        .run_pipeline("/proj", "We need user authentication", &config)
        .await;

    assert_eq!(outcome.exploration.files_read, 0);
    assert!(outcome.exploration.confidence <= 0.5);
    assert!(outcome.completion.is_some());
    assert_eq!(invoker.calls(ToolName::ReadFiles), 0);
}

#[tokio::test]
async fn repeated_pipelines_are_deterministic_in_content() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);
    let coordinator = coordinator(&invoker);
    let vision = "We need user authentication. Add csv export.";

    let first = coordinator
        .run_pipeline("/proj", vision, &CoordinatorConfig::default())
        .await;
    let second = coordinator
        .run_pipeline("/proj", vision, &CoordinatorConfig::default())
        .await;

    assert_eq!(first.exploration.technologies, second.exploration.technologies);
    assert_eq!(first.exploration.key_files, second.exploration.key_files);
    assert_eq!(first.planning.features, second.planning.features);
    assert_eq!(
        first
            .planning
            .tech_stack
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>(),
        second
            .planning
            .tech_stack
            .iter()
            .map(|c| c.name.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!(coordinator.explorations.len(), 2);
}

#[tokio::test]
async fn ledgers_are_isolated_between_coordinators() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);

    let first = coordinator(&invoker);
    let second = coordinator(&invoker);
    first
        .explore("/proj", "We need things", &ExplorationOptions::default())
        .await;

    assert_eq!(first.explorations.len(), 1);
    assert!(second.explorations.is_empty());

    first.clear_history();
    assert!(first.explorations.is_empty());
}

#[tokio::test]
async fn last_accessor_tracks_the_most_recent_report() {
    let invoker = Arc::new(ScriptedInvoker::new());
    scripted_project(&invoker);
    let coordinator = coordinator(&invoker);

    let first = coordinator
        .explore("/proj", "We need things", &ExplorationOptions::default())
        .await;
    let second = coordinator
        .explore("/proj", "We need things", &ExplorationOptions::default())
        .await;

    let last = coordinator.explorations.last().expect("non-empty ledger");
    assert_eq!(last.id, second.id);
    assert!(last.id != first.id);
}
