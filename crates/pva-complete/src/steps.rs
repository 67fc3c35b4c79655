//! Plan resolution and per-deliverable handlers
//!
//! Each deliverable maps to exactly one handler; handlers write through the
//! tool boundary and report what they touched. A failed write is recorded by
//! the caller, never raised.

use pva_heuristics::extract_features;
use pva_report::{
    CompletionError, ImplementationStep, PlanningReport, StepPhase, StepPriority, TechCategory,
};
use pva_tools::{ToolError, Tools};
use serde_json::{json, Value};

/// Cap on files a core-feature step may write
const MAX_CORE_FILES: usize = 5;

/// What one executed step touched
#[derive(Debug, Default)]
pub(crate) struct StepOutcome {
    pub created: Vec<String>,
    pub modified: Vec<String>,
    pub errors: Vec<CompletionError>,
}

/// Use the supplied plan verbatim, else synthesize a minimal fallback
pub(crate) fn resolve_plan(
    planning: Option<&PlanningReport>,
    vision: &str,
) -> Vec<ImplementationStep> {
    if let Some(planning) = planning {
        if !planning.implementation_plan.is_empty() {
            return planning.implementation_plan.clone();
        }
    }
    fallback_plan(vision)
}

fn fallback_plan(vision: &str) -> Vec<ImplementationStep> {
    let features = extract_features(vision);
    let core: Vec<String> = if features.is_empty() {
        vec!["core implementation".to_string()]
    } else {
        features.into_iter().take(2).collect()
    };
    vec![
        ImplementationStep::new("setup", StepPhase::Setup, "scaffold the project")
            .with_priority(StepPriority::Critical)
            .with_deliverables(vec!["README.md".to_string(), "package.json".to_string()]),
        ImplementationStep::new("core-features", StepPhase::Core, "implement the vision")
            .depends_on("setup")
            .with_priority(StepPriority::High)
            .with_deliverables(core),
    ]
}

/// Primary language of the run, from the plan when available
pub(crate) fn language_of(planning: Option<&PlanningReport>) -> String {
    planning
        .and_then(|p| p.choice(TechCategory::Language))
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "javascript".to_string())
}

pub(crate) fn extension_for(language: &str) -> &'static str {
    match language {
        "typescript" => "ts",
        "python" => "py",
        "rust" => "rs",
        "go" => "go",
        _ => "js",
    }
}

/// Lowercase, alphanumeric-and-dash file slug for a feature description
pub(crate) fn slug(text: &str) -> String {
    let mut out = String::new();
    for c in text.chars().take(40) {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "feature".to_string()
    } else {
        trimmed.to_string()
    }
}

fn manifest_content(name: &str, planning: Option<&PlanningReport>) -> String {
    let (runtime, dev) = planning
        .map(|p| (p.dependencies.runtime.clone(), p.dependencies.dev.clone()))
        .unwrap_or_default();
    let deps: serde_json::Map<String, Value> =
        runtime.iter().map(|d| (d.clone(), json!("latest"))).collect();
    let dev_deps: serde_json::Map<String, Value> =
        dev.iter().map(|d| (d.clone(), json!("latest"))).collect();
    let manifest = json!({
        "name": name,
        "version": "0.1.0",
        "scripts": { "test": "echo \"no tests yet\"" },
        "dependencies": deps,
        "devDependencies": dev_deps,
    });
    serde_json::to_string_pretty(&manifest).unwrap_or_else(|_| "{}".to_string())
}

fn project_name(dir: &str) -> String {
    dir.rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .unwrap_or("project")
        .to_string()
}

async fn write_one(
    tools: &Tools<'_>,
    dir: &str,
    path: &str,
    content: String,
    outcome: &mut StepOutcome,
) -> Result<(), ToolError> {
    let result = tools
        .write_files(dir, json!([{ "path": path, "content": content }]))
        .await?;
    let modified = result
        .get("modified")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if modified {
        outcome.modified.push(path.to_string());
    } else {
        outcome.created.push(path.to_string());
    }
    Ok(())
}

/// Execute one step by dispatching each deliverable to its handler
///
/// Write failures become recorded errors on the outcome; the remaining
/// deliverables still run.
pub(crate) async fn execute_step(
    tools: &Tools<'_>,
    dir: &str,
    vision: &str,
    step: &ImplementationStep,
    planning: Option<&PlanningReport>,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    let language = language_of(planning);
    let ext = extension_for(&language);
    let mut core_written = 0usize;

    for deliverable in &step.deliverables {
        let lowered = deliverable.to_lowercase();
        let result = if lowered.contains("readme") {
            let content = format!("# {}\n\n{vision}\n", project_name(dir));
            write_one(tools, dir, "README.md", content, &mut outcome).await
        } else if is_manifest(&lowered) {
            let content = if lowered == "package.json" {
                manifest_content(&project_name(dir), planning)
            } else {
                format!("# manifest for {}\n", project_name(dir))
            };
            write_one(tools, dir, deliverable, content, &mut outcome).await
        } else if lowered == "test-scaffold" {
            let path = format!("tests/app.test.{ext}");
            let content = "// scaffold: one smoke test per feature\n".to_string();
            write_one(tools, dir, &path, content, &mut outcome).await
        } else if lowered == "docs" {
            let content = format!("# Usage\n\nGenerated for: {vision}\n");
            write_one(tools, dir, "docs/USAGE.md", content, &mut outcome).await
        } else if looks_like_path(deliverable) {
            let content = format!("// {deliverable}: created during setup\n");
            write_one(tools, dir, deliverable, content, &mut outcome).await
        } else {
            // Feature description: one stub module per feature, capped
            if core_written >= MAX_CORE_FILES {
                continue;
            }
            core_written += 1;
            let path = format!("src/features/{}.{ext}", slug(deliverable));
            let content = format!("// {deliverable}\nexport {{}};\n");
            write_one(tools, dir, &path, content, &mut outcome).await
        };
        if let Err(err) = result {
            outcome
                .errors
                .push(CompletionError::step(&step.id, err.to_string()));
        }
    }

    outcome
}

fn is_manifest(name: &str) -> bool {
    matches!(
        name,
        "package.json" | "cargo.toml" | "pyproject.toml" | "go.mod" | "requirements.txt"
    )
}

fn looks_like_path(deliverable: &str) -> bool {
    !deliverable.contains(' ') && (deliverable.contains('/') || deliverable.contains('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pva_test_utils::ScriptedInvoker;
    use pva_tools::{ToolName, ToolOutcome};

    #[test]
    fn fallback_plan_covers_setup_and_core() {
        let plan = resolve_plan(None, "Add a README and package.json");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].id, "setup");
        assert!(plan[0].deliverables.contains(&"README.md".to_string()));
        assert_eq!(plan[1].dependencies, vec!["setup".to_string()]);
    }

    #[test]
    fn slugs_are_filesystem_safe() {
        assert_eq!(slug("Add CSV export!"), "add-csv-export");
        assert_eq!(slug("  "), "feature");
        assert!(slug(&"x".repeat(100)).len() <= 40);
    }

    #[test]
    fn path_detection() {
        assert!(looks_like_path("src/index.ts"));
        assert!(looks_like_path("tsconfig.json"));
        assert!(!looks_like_path("support csv export"));
    }

    #[tokio::test]
    async fn step_writes_each_deliverable() {
        let invoker = ScriptedInvoker::new();
        invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
        let tools = Tools::new(&invoker);

        let step = ImplementationStep::new("setup", StepPhase::Setup, "scaffold")
            .with_deliverables(vec!["README.md".to_string(), "package.json".to_string()]);
        let outcome = execute_step(&tools, "/proj", "a todo app", &step, None).await;

        assert_eq!(outcome.created, vec!["README.md", "package.json"]);
        assert!(outcome.errors.is_empty());
        assert_eq!(invoker.calls(ToolName::WriteFiles), 2);
    }

    #[tokio::test]
    async fn write_failure_recorded_without_aborting() {
        let invoker = ScriptedInvoker::new();
        invoker.enqueue(ToolName::WriteFiles, ToolOutcome::err("disk full"));
        invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
        let tools = Tools::new(&invoker);

        let step = ImplementationStep::new("setup", StepPhase::Setup, "scaffold")
            .with_deliverables(vec!["README.md".to_string(), "package.json".to_string()]);
        let outcome = execute_step(&tools, "/proj", "v", &step, None).await;

        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].blocking);
        assert_eq!(outcome.created, vec!["package.json"]);
    }

    #[tokio::test]
    async fn core_features_cap_at_five_files() {
        let invoker = ScriptedInvoker::new();
        invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({})));
        let tools = Tools::new(&invoker);

        let deliverables: Vec<String> = (0..8).map(|i| format!("feature number {i}")).collect();
        let step = ImplementationStep::new("core-features", StepPhase::Core, "features")
            .with_deliverables(deliverables);
        let outcome = execute_step(&tools, "/proj", "v", &step, None).await;

        assert_eq!(outcome.created.len(), 5);
        assert!(outcome.created[0].starts_with("src/features/"));
    }

    #[tokio::test]
    async fn rewritten_files_count_as_modified() {
        let invoker = ScriptedInvoker::new();
        invoker.respond(ToolName::WriteFiles, ToolOutcome::ok(json!({"modified": true})));
        let tools = Tools::new(&invoker);

        let step = ImplementationStep::new("setup", StepPhase::Setup, "scaffold")
            .with_deliverables(vec!["README.md".to_string()]);
        let outcome = execute_step(&tools, "/proj", "v", &step, None).await;

        assert!(outcome.created.is_empty());
        assert_eq!(outcome.modified, vec!["README.md"]);
    }
}
