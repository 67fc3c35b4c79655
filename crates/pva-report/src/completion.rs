//! Completion phase report

use crate::healing::HealingAction;
use crate::phase::ReportId;
use crate::plan::ValidationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Typed result of one validation battery member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Battery kind that ran
    pub kind: ValidationKind,
    /// Whether the check passed
    pub passed: bool,
    /// Reported execution time
    pub execution_time_ms: u64,
    /// Error lines
    pub errors: Vec<String>,
    /// Warning lines
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Result representing a tool-boundary failure for this kind
    #[must_use]
    pub fn tool_failure(kind: ValidationKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            passed: false,
            execution_time_ms: 0,
            errors: vec![error.into()],
            warnings: Vec::new(),
        }
    }
}

/// Stubbed deployment record (no actual deployment is performed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentRecord {
    /// Requested target
    pub target: String,
    /// Always "simulated" in this core
    pub status: String,
    /// Human-readable note
    pub detail: String,
}

/// One recorded failure during completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionError {
    /// Step the failure belongs to, when attributable
    pub step_id: Option<String>,
    /// What went wrong
    pub message: String,
    /// Whether the failure blocks overall success
    pub blocking: bool,
}

impl CompletionError {
    /// Blocking failure attributed to a step
    #[inline]
    #[must_use]
    pub fn step(step_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            step_id: Some(step_id.into()),
            message: message.into(),
            blocking: true,
        }
    }

    /// Non-blocking failure with no step attribution
    #[inline]
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            step_id: None,
            message: message.into(),
            blocking: false,
        }
    }
}

/// Output of the completion phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReport {
    /// Report identifier
    pub id: ReportId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Overall success (see `CompletionEngine` for the exact predicate)
    pub success: bool,
    /// Files written for the first time
    pub files_created: Vec<String>,
    /// Files that already existed and were rewritten
    pub files_modified: Vec<String>,
    /// Steps that actually executed
    pub steps_executed: usize,
    /// Steps the resolved plan contained
    pub steps_planned: usize,
    /// Typed validation outcomes
    pub validation_results: Vec<ValidationResult>,
    /// Healing actions taken or suggested
    pub healing_actions: Vec<HealingAction>,
    /// Commit hash when auto-commit succeeded
    pub commit_hash: Option<String>,
    /// Stubbed deployment record when a target was requested
    pub deployment: Option<DeploymentRecord>,
    /// Heuristic reliability score in `[0.1, 1]`
    pub confidence: f64,
    /// One-paragraph outcome summary
    pub summary: String,
    /// Suggested follow-ups
    pub next_steps: Vec<String>,
    /// Recorded failures
    pub errors: Vec<CompletionError>,
}

impl CompletionReport {
    /// Total files touched by the phase
    #[inline]
    #[must_use]
    pub fn files_touched(&self) -> usize {
        self.files_created.len() + self.files_modified.len()
    }

    /// Whether any recorded error blocks success
    #[inline]
    #[must_use]
    pub fn has_blocking_errors(&self) -> bool {
        self.errors.iter().any(|e| e.blocking)
    }

    /// Total validation error lines across all results
    #[inline]
    #[must_use]
    pub fn validation_error_count(&self) -> usize {
        self.validation_results.iter().map(|r| r.errors.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::healing::{HealingAction, HealingKind};

    fn empty_report() -> CompletionReport {
        CompletionReport {
            id: ReportId::new(),
            created_at: Utc::now(),
            success: false,
            files_created: Vec::new(),
            files_modified: Vec::new(),
            steps_executed: 0,
            steps_planned: 0,
            validation_results: Vec::new(),
            healing_actions: Vec::new(),
            commit_hash: None,
            deployment: None,
            confidence: 0.1,
            summary: String::new(),
            next_steps: Vec::new(),
            errors: Vec::new(),
        }
    }

    #[test]
    fn files_touched_sums_both_lists() {
        let mut report = empty_report();
        report.files_created.push("README.md".to_string());
        report.files_modified.push("package.json".to_string());
        assert_eq!(report.files_touched(), 2);
    }

    #[test]
    fn blocking_error_detection() {
        let mut report = empty_report();
        report.errors.push(CompletionError::warning("lint noise"));
        assert!(!report.has_blocking_errors());
        report.errors.push(CompletionError::step("core", "write failed"));
        assert!(report.has_blocking_errors());
    }

    #[test]
    fn validation_error_count_sums_lines() {
        let mut report = empty_report();
        report.validation_results.push(ValidationResult {
            kind: ValidationKind::Typescript,
            passed: false,
            execution_time_ms: 10,
            errors: vec!["e1".to_string(), "e2".to_string()],
            warnings: Vec::new(),
        });
        report
            .validation_results
            .push(ValidationResult::tool_failure(ValidationKind::Build, "timeout"));
        assert_eq!(report.validation_error_count(), 3);
    }

    #[test]
    fn report_serializes_with_healing_actions() {
        let mut report = empty_report();
        report
            .healing_actions
            .push(HealingAction::new(HealingKind::Rollback, "workspace", "undo partial writes"));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("Rollback"));
    }
}
