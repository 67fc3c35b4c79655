//! Exploration phase report

use crate::healing::HealingAction;
use crate::phase::{Phase, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on key files carried by a report
pub const MAX_KEY_FILES: usize = 20;

/// Upper bound on captured requirements
pub const MAX_REQUIREMENTS: usize = 10;

/// Categories of the exploration validation battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckCategory {
    /// Project structure was obtained and non-empty
    Structure,
    /// Key-file count is within bounds
    KeyFiles,
    /// At least one technology was detected
    Technologies,
    /// Requirements overlap with the vision text
    Requirements,
    /// Confidence is finite and in range
    Confidence,
    /// The tool boundary answered a probe
    ToolAccess,
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CheckCategory::Structure => "structure",
            CheckCategory::KeyFiles => "key-files",
            CheckCategory::Technologies => "technologies",
            CheckCategory::Requirements => "requirements",
            CheckCategory::Confidence => "confidence",
            CheckCategory::ToolAccess => "tool-access",
        };
        write!(f, "{name}")
    }
}

/// One check outcome from the validation battery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Which battery category ran
    pub category: CheckCategory,
    /// Whether the check passed
    pub passed: bool,
    /// Short explanation of the outcome
    pub detail: String,
}

impl ValidationCheck {
    /// Create a passing check
    #[inline]
    #[must_use]
    pub fn pass(category: CheckCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            passed: true,
            detail: detail.into(),
        }
    }

    /// Create a failing check
    #[inline]
    #[must_use]
    pub fn fail(category: CheckCategory, detail: impl Into<String>) -> Self {
        Self {
            category,
            passed: false,
            detail: detail.into(),
        }
    }
}

/// Result of running the validation battery once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Whether every check passed
    pub passed: bool,
    /// Individual check outcomes
    pub checks: Vec<ValidationCheck>,
}

impl ValidationSummary {
    /// Build a summary from check outcomes
    #[inline]
    #[must_use]
    pub fn from_checks(checks: Vec<ValidationCheck>) -> Self {
        Self {
            passed: checks.iter().all(|c| c.passed),
            checks,
        }
    }

    /// Categories that failed
    #[must_use]
    pub fn failed_categories(&self) -> Vec<CheckCategory> {
        self.checks
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.category)
            .collect()
    }
}

/// Record of the bounded healing pass that may follow a failed validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingSummary {
    /// One remediation per failing category, in battery order
    pub actions: Vec<HealingAction>,
    /// Whether the single revalidation ran
    pub revalidated: bool,
    /// Whether the revalidation passed
    pub passed_after: bool,
}

/// Output of the exploration phase
///
/// Immutable once created; appended to the ledger and passed downstream by
/// value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationReport {
    /// Report identifier
    pub id: ReportId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Tree-like structure dump, or a placeholder when the probe failed
    pub project_structure: String,
    /// Whether the structure probe succeeded
    pub structure_available: bool,
    /// Ranked key files, at most [`MAX_KEY_FILES`]
    pub key_files: Vec<String>,
    /// Detected technologies, deduplicated, in indicator-table order
    pub technologies: Vec<String>,
    /// Captured requirements, at most [`MAX_REQUIREMENTS`]
    pub requirements: Vec<String>,
    /// Rule-table recommendations
    pub recommendations: Vec<String>,
    /// How many file contents were actually read
    pub files_read: usize,
    /// Heuristic reliability score in `[0, 1]`
    pub confidence: f64,
    /// Where the pipeline should go next (`Explore` or `Plan`)
    pub next_phase: Phase,
    /// Validation battery outcome, when validation was enabled
    pub validation: Option<ValidationSummary>,
    /// Healing pass record, when healing ran
    pub healing: Option<HealingSummary>,
}

impl ExplorationReport {
    /// Minimal degraded report used when the phase fails internally
    #[must_use]
    pub fn degraded(detail: impl Into<String>) -> Self {
        Self {
            id: ReportId::new(),
            created_at: Utc::now(),
            project_structure: detail.into(),
            structure_available: false,
            key_files: Vec::new(),
            technologies: Vec::new(),
            requirements: Vec::new(),
            recommendations: vec!["Re-run exploration once the tool boundary is reachable".to_string()],
            files_read: 0,
            confidence: 0.2,
            next_phase: Phase::Explore,
            validation: None,
            healing: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_from_checks_aggregates() {
        let summary = ValidationSummary::from_checks(vec![
            ValidationCheck::pass(CheckCategory::Structure, "ok"),
            ValidationCheck::fail(CheckCategory::Technologies, "none detected"),
        ]);
        assert!(!summary.passed);
        assert_eq!(summary.failed_categories(), vec![CheckCategory::Technologies]);
    }

    #[test]
    fn degraded_report_bounds() {
        let report = ExplorationReport::degraded("tree probe failed");
        assert_eq!(report.confidence, 0.2);
        assert_eq!(report.next_phase, Phase::Explore);
        assert!(report.key_files.is_empty());
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = ExplorationReport::degraded("x");
        let json = serde_json::to_string(&report).unwrap();
        let back: ExplorationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, report.id);
        assert_eq!(back.confidence, report.confidence);
    }
}
