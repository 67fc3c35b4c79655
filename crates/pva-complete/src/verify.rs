//! Validation battery, categorized healing, test probes, commit and deploy

use pva_report::{
    CompletionError, DeploymentRecord, HealingAction, HealingKind, ImplementationStep, StepPhase,
    ValidationKind, ValidationResult,
};
use pva_tools::{parse_validation_output, Tools};
use serde_json::Value;

/// How many files the TypeScript fix routine will touch in one pass
const MAX_TS_FIX_FILES: usize = 3;

/// Shell probes run for `runTests`; failures are never fatal
const TEST_PROBES: &[&str] = &["npm test --if-present", "node --version"];

/// Battery members for this run: a fixed base plus stack-dependent extras
pub(crate) fn battery(language: &str, plan: &[ImplementationStep]) -> Vec<ValidationKind> {
    let mut kinds = vec![ValidationKind::Custom, ValidationKind::Eslint, ValidationKind::Build];
    match language {
        "typescript" => kinds.push(ValidationKind::Typescript),
        "javascript" => kinds.push(ValidationKind::Javascript),
        _ => {}
    }
    if plan.iter().any(|s| s.phase == StepPhase::Testing) {
        kinds.push(ValidationKind::Test);
    }
    kinds
}

fn validation_text(value: &Value) -> &str {
    value
        .as_str()
        .or_else(|| value.get("output").and_then(Value::as_str))
        .unwrap_or_default()
}

/// Run every battery member and parse the formatted text into typed results
pub(crate) async fn run_battery(
    tools: &Tools<'_>,
    dir: &str,
    kinds: &[ValidationKind],
) -> Vec<ValidationResult> {
    let mut results = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let result = match tools.validate_project(dir, kind.as_str()).await {
            Ok(value) => {
                let parsed = parse_validation_output(validation_text(&value));
                ValidationResult {
                    kind: *kind,
                    passed: parsed.passed,
                    execution_time_ms: parsed.execution_time_ms,
                    errors: parsed.errors,
                    warnings: parsed.warnings,
                }
            }
            Err(err) => ValidationResult::tool_failure(*kind, err.to_string()),
        };
        tracing::debug!(kind = %kind, passed = result.passed, "validation member finished");
        results.push(result);
    }
    results
}

/// Naive source patch for the most common TypeScript syntax complaints
///
/// Appends missing semicolons to statement-looking lines. Returns the fixed
/// text and how many lines changed, or `None` when nothing applied.
pub(crate) fn patch_typescript(content: &str) -> Option<(String, usize)> {
    let mut changed = 0usize;
    let mut out = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim_end();
        let needs_semicolon = {
            let t = trimmed.trim_start();
            !t.is_empty()
                && !t.starts_with("//")
                && !t.starts_with('*')
                && trimmed
                    .chars()
                    .last()
                    .is_some_and(|c| c.is_ascii_alphanumeric() || c == ')' || c == '\'' || c == '"')
                && !t.ends_with('{')
                && !t.ends_with(',')
        };
        if needs_semicolon {
            changed += 1;
            out.push(format!("{trimmed};"));
        } else {
            out.push(line.to_string());
        }
    }
    if changed == 0 {
        None
    } else {
        let mut text = out.join("\n");
        if content.ends_with('\n') {
            text.push('\n');
        }
        Some((text, changed))
    }
}

fn ts_file_of(error: &str) -> Option<&str> {
    let head = error.split('(').next()?.trim();
    (head.ends_with(".ts") || head.ends_with(".tsx")).then_some(head)
}

async fn heal_typescript(
    tools: &Tools<'_>,
    dir: &str,
    errors: &[String],
) -> HealingAction {
    let action = HealingAction::new(HealingKind::Fix, "typescript", "apply pattern fixes");
    let mut files: Vec<&str> = Vec::new();
    for error in errors {
        if let Some(file) = ts_file_of(error) {
            if !files.contains(&file) {
                files.push(file);
            }
        }
    }
    files.truncate(MAX_TS_FIX_FILES);
    if files.is_empty() {
        return action.executed_err("no file references in the errors");
    }

    let mut patched = 0usize;
    for file in &files {
        let path = (*file).to_string();
        let Ok(value) = tools.read_files(dir, std::slice::from_ref(&path)).await else {
            continue;
        };
        let content = value
            .get("files")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .or(Some(&value))
            .and_then(|f| f.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if let Some((fixed, _)) = patch_typescript(content) {
            if tools
                .write_files(dir, serde_json::json!([{ "path": path, "content": fixed }]))
                .await
                .is_ok()
            {
                patched += 1;
            }
        }
    }
    if patched == 0 {
        action.executed_err("pattern fixes did not apply")
    } else {
        action.executed_ok(format!("patched {patched} file(s)"))
    }
}

/// One remediation routine per failure group, in a fixed order
///
/// Groups: TypeScript errors, lint errors, test failures (suggestions only),
/// build errors, failed step deliverables. At most one routine per group.
pub(crate) async fn heal(
    tools: &Tools<'_>,
    dir: &str,
    results: &[ValidationResult],
    step_errors: &[CompletionError],
    plan: &[ImplementationStep],
) -> Vec<HealingAction> {
    let mut actions = Vec::new();
    let errors_of = |kind: ValidationKind| -> Vec<String> {
        results
            .iter()
            .filter(|r| r.kind == kind && !r.passed)
            .flat_map(|r| r.errors.iter().cloned())
            .collect()
    };

    let ts_errors = errors_of(ValidationKind::Typescript);
    if !ts_errors.is_empty() {
        actions.push(heal_typescript(tools, dir, &ts_errors).await);
    }

    let lint_failed = !errors_of(ValidationKind::Eslint).is_empty()
        || !errors_of(ValidationKind::Javascript).is_empty();
    if lint_failed {
        let action = HealingAction::new(HealingKind::Fix, "eslint", "delegate to eslint --fix");
        actions.push(match tools.run_command(dir, "npx eslint . --fix").await {
            Ok(_) => action.executed_ok("eslint fix pass ran"),
            Err(err) => action.executed_err(err.to_string()),
        });
    }

    let test_errors = errors_of(ValidationKind::Test);
    if !test_errors.is_empty() {
        // Rewriting tests to pass would hide regressions; suggest only.
        actions.push(
            HealingAction::new(HealingKind::Fix, "tests", "review failing tests").suggestion(
                format!("{} failing test(s) need manual review", test_errors.len()),
            ),
        );
    }

    if !errors_of(ValidationKind::Build).is_empty() {
        let action =
            HealingAction::new(HealingKind::Update, "build", "reinstall dependencies");
        actions.push(match tools.run_command(dir, "npm install").await {
            Ok(_) => action.executed_ok("dependencies reinstalled"),
            Err(err) => action.executed_err(err.to_string()),
        });
    }

    if !step_errors.is_empty() {
        actions.push(heal_missing_deliverables(tools, dir, step_errors, plan).await);
    }

    actions
}

async fn heal_missing_deliverables(
    tools: &Tools<'_>,
    dir: &str,
    step_errors: &[CompletionError],
    plan: &[ImplementationStep],
) -> HealingAction {
    let action = HealingAction::new(
        HealingKind::Create,
        "deliverables",
        "write placeholders for failed steps",
    );
    let failed_steps: Vec<&str> = step_errors
        .iter()
        .filter_map(|e| e.step_id.as_deref())
        .collect();
    let mut written = 0usize;
    for step in plan.iter().filter(|s| failed_steps.contains(&s.id.as_str())) {
        for deliverable in step
            .deliverables
            .iter()
            .filter(|d| !d.contains(' ') && d.contains('.'))
            .take(2)
        {
            let content = format!("// placeholder for {deliverable}\n");
            if tools
                .write_files(dir, serde_json::json!([{ "path": deliverable, "content": content }]))
                .await
                .is_ok()
            {
                written += 1;
            }
        }
    }
    if written == 0 {
        action.suggestion("no path-like deliverables to placeholder")
    } else {
        action.executed_ok(format!("{written} placeholder(s) written"))
    }
}

/// Fixed shell probes, each recorded as a tests-run result
///
/// Failures carry the probe detail as a warning, never an error, so a
/// broken test runner cannot block completion on its own.
pub(crate) async fn run_test_probes(tools: &Tools<'_>, dir: &str) -> Vec<ValidationResult> {
    let mut results = Vec::with_capacity(TEST_PROBES.len());
    for probe in TEST_PROBES {
        let result = match tools.run_command(dir, probe).await {
            Ok(_) => ValidationResult {
                kind: ValidationKind::Test,
                passed: true,
                execution_time_ms: 0,
                errors: Vec::new(),
                warnings: Vec::new(),
            },
            Err(err) => ValidationResult {
                kind: ValidationKind::Test,
                passed: false,
                execution_time_ms: 0,
                errors: Vec::new(),
                warnings: vec![format!("test probe `{probe}` failed: {err}")],
            },
        };
        tracing::debug!(probe = *probe, passed = result.passed, "test probe finished");
        results.push(result);
    }
    results
}

fn hash_of(value: &Value) -> Option<String> {
    value
        .get("hash")
        .and_then(Value::as_str)
        .or_else(|| value.get("stdout").and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Stage everything and commit; a failure just leaves the hash unset
pub(crate) async fn auto_commit(tools: &Tools<'_>, dir: &str, message: &str) -> Option<String> {
    if let Err(err) = tools.git(dir, "add", serde_json::json!(["."])).await {
        tracing::warn!(error = %err, "git add failed, skipping commit");
        return None;
    }
    match tools
        .git(dir, "commit", serde_json::json!({ "message": message }))
        .await
    {
        Ok(value) => hash_of(&value),
        Err(err) => {
            tracing::warn!(error = %err, "commit failed, leaving hash unset");
            None
        }
    }
}

/// Deployment is simulated; nothing leaves the machine
pub(crate) fn deploy(target: &str) -> DeploymentRecord {
    DeploymentRecord {
        target: target.to_string(),
        status: "simulated".to_string(),
        detail: format!("deployment to {target} recorded, not performed"),
    }
}
