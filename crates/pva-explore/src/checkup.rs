//! Validation battery and the bounded healing pass
//!
//! Six checks inspect what the survey produced. On failure, healing runs at
//! most once: one remediation per failing category, in battery order, then a
//! single revalidation. There is no second healing attempt.

use pva_heuristics::{extract_requirements_relaxed, infer_from_extensions, rank_key_files, token_overlap};
use pva_report::{
    clamp_confidence, CheckCategory, HealingAction, HealingKind, HealingSummary, ValidationCheck,
    ValidationSummary, MAX_KEY_FILES,
};
use pva_tools::Tools;

use crate::engine::{base_confidence, Findings};
use crate::survey;

/// Run the battery and, when enabled and needed, one healing pass
pub(crate) async fn validate_and_heal(
    tools: &Tools<'_>,
    dir: &str,
    vision: &str,
    findings: &mut Findings,
    heal_enabled: bool,
) -> (ValidationSummary, Option<HealingSummary>) {
    let summary = run_battery(tools, dir, vision, findings).await;
    if summary.passed || !heal_enabled {
        return (summary, None);
    }

    let mut actions = Vec::new();
    for category in summary.failed_categories() {
        actions.push(heal_category(tools, dir, vision, findings, category).await);
    }
    findings.confidence = base_confidence(findings);

    let revalidation = run_battery(tools, dir, vision, findings).await;
    tracing::info!(
        actions = actions.len(),
        passed_after = revalidation.passed,
        "healing pass finished"
    );
    let healing = HealingSummary {
        actions,
        revalidated: true,
        passed_after: revalidation.passed,
    };
    (summary, Some(healing))
}

async fn run_battery(
    tools: &Tools<'_>,
    dir: &str,
    vision: &str,
    findings: &Findings,
) -> ValidationSummary {
    let mut checks = Vec::with_capacity(6);

    checks.push(if findings.structure_available && !findings.paths.is_empty() {
        ValidationCheck::pass(
            CheckCategory::Structure,
            format!("{} paths surveyed", findings.paths.len()),
        )
    } else {
        ValidationCheck::fail(CheckCategory::Structure, "no usable project structure")
    });

    checks.push(
        if !findings.key_files.is_empty() && findings.key_files.len() <= MAX_KEY_FILES {
            ValidationCheck::pass(
                CheckCategory::KeyFiles,
                format!("{} key files ranked", findings.key_files.len()),
            )
        } else {
            ValidationCheck::fail(CheckCategory::KeyFiles, "no key files identified")
        },
    );

    checks.push(if findings.technologies.is_empty() {
        ValidationCheck::fail(CheckCategory::Technologies, "no technologies detected")
    } else {
        ValidationCheck::pass(
            CheckCategory::Technologies,
            findings.technologies.join(", "),
        )
    });

    let requirements_grounded = !findings.requirements.is_empty()
        && findings
            .requirements
            .iter()
            .all(|r| token_overlap(r, vision) > 0.0);
    checks.push(if requirements_grounded {
        ValidationCheck::pass(
            CheckCategory::Requirements,
            format!("{} requirements grounded in the vision", findings.requirements.len()),
        )
    } else {
        ValidationCheck::fail(
            CheckCategory::Requirements,
            "no requirements captured from the vision",
        )
    });

    checks.push(
        if findings.confidence.is_finite() && (0.0..=1.0).contains(&findings.confidence) {
            ValidationCheck::pass(
                CheckCategory::Confidence,
                format!("confidence {:.2} in range", findings.confidence),
            )
        } else {
            ValidationCheck::fail(CheckCategory::Confidence, "confidence out of range")
        },
    );

    checks.push(match tools.run_command(dir, "echo ok").await {
        Ok(_) => ValidationCheck::pass(CheckCategory::ToolAccess, "command probe answered"),
        Err(err) => ValidationCheck::fail(CheckCategory::ToolAccess, err.to_string()),
    });

    ValidationSummary::from_checks(checks)
}

/// One remediation for one failing category
async fn heal_category(
    tools: &Tools<'_>,
    dir: &str,
    vision: &str,
    findings: &mut Findings,
    category: CheckCategory,
) -> HealingAction {
    match category {
        CheckCategory::Structure => {
            let action = HealingAction::new(
                HealingKind::Fix,
                "project-structure",
                "deeper structure probe",
            );
            match tools.project_tree_deep(dir).await {
                Ok(value) => {
                    let paths = survey::collect_paths(&value);
                    if paths.is_empty() {
                        action.executed_err("deep probe found nothing")
                    } else {
                        findings.structure = survey::render_structure(&value, &paths);
                        findings.structure_available = true;
                        findings.paths = paths;
                        action.executed_ok(format!("{} paths recovered", findings.paths.len()))
                    }
                }
                Err(err) => action.executed_err(err.to_string()),
            }
        }
        CheckCategory::KeyFiles => {
            let action = HealingAction::new(HealingKind::Fix, "key-files", "re-rank key files");
            if !findings.paths.is_empty() {
                findings.key_files = rank_key_files(&findings.paths, MAX_KEY_FILES);
                action.executed_ok(format!("{} ranked from refreshed survey", findings.key_files.len()))
            } else {
                match tools.run_command(dir, "find . -maxdepth 3 -type f").await {
                    Ok(value) => {
                        let paths = survey::paths_from_command(&value);
                        findings.key_files = rank_key_files(&paths, MAX_KEY_FILES);
                        if findings.paths.is_empty() {
                            findings.paths = paths;
                        }
                        if findings.key_files.is_empty() {
                            action.executed_err("file listing found nothing")
                        } else {
                            action.executed_ok(format!("{} listed by command", findings.key_files.len()))
                        }
                    }
                    Err(err) => action.executed_err(err.to_string()),
                }
            }
        }
        CheckCategory::Technologies => {
            let action = HealingAction::new(
                HealingKind::Update,
                "technologies",
                "infer stack from file extensions",
            );
            let inferred = infer_from_extensions(&findings.paths);
            if inferred.is_empty() {
                action.executed_err("no extension signals either")
            } else {
                findings.technologies = inferred;
                action.executed_ok(findings.technologies.join(", "))
            }
        }
        CheckCategory::Requirements => {
            let action = HealingAction::new(
                HealingKind::Update,
                "requirements",
                "relaxed capture over vision and read files",
            );
            let mut corpus = vision.to_string();
            for sample in &findings.samples {
                if !sample.content.is_empty() {
                    corpus.push('\n');
                    corpus.push_str(&sample.content);
                }
            }
            let relaxed = extract_requirements_relaxed(&corpus);
            if relaxed.is_empty() {
                action.executed_err("nothing captured even relaxed")
            } else {
                findings.requirements = relaxed;
                action.executed_ok(format!("{} captured relaxed", findings.requirements.len()))
            }
        }
        CheckCategory::Confidence => {
            findings.confidence = clamp_confidence(findings.confidence);
            HealingAction::new(HealingKind::Fix, "confidence", "clamp into range")
                .executed_ok(format!("{:.2}", findings.confidence))
        }
        CheckCategory::ToolAccess => {
            let action = HealingAction::new(HealingKind::Fix, "tool-access", "second command probe");
            match tools.run_command(dir, "pwd").await {
                Ok(_) => action.executed_ok("probe answered on retry"),
                Err(err) => action.executed_err(err.to_string()),
            }
        }
    }
}
