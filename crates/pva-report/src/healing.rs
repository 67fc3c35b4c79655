//! Healing actions
//!
//! A healing action records one bounded remediation attempt. Actions are only
//! created in response to a specific categorized failure, never speculatively.

use serde::{Deserialize, Serialize};

/// Kind of remediation performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealingKind {
    /// Patch an existing artifact in place
    Fix,
    /// Create a missing artifact
    Create,
    /// Update derived data (re-probe, re-infer)
    Update,
    /// Remove an artifact
    Delete,
    /// Roll back to the pre-phase state
    Rollback,
}

/// One remediation attempt, executed or suggested
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingAction {
    /// Kind of remediation
    pub kind: HealingKind,
    /// What the action targeted (category, file path, tool name)
    pub target: String,
    /// Human-readable description of the attempt
    pub description: String,
    /// Whether the action actually ran
    pub executed: bool,
    /// Whether the action ran without human involvement
    pub automated: bool,
    /// Outcome detail when the action ran and succeeded
    pub result: Option<String>,
    /// Failure detail when the action ran and failed
    pub error: Option<String>,
}

impl HealingAction {
    /// Create a new unexecuted action
    #[inline]
    #[must_use]
    pub fn new(kind: HealingKind, target: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            description: description.into(),
            executed: false,
            automated: false,
            result: None,
            error: None,
        }
    }

    /// Mark as executed automatically with a success result
    #[inline]
    #[must_use]
    pub fn executed_ok(mut self, result: impl Into<String>) -> Self {
        self.executed = true;
        self.automated = true;
        self.result = Some(result.into());
        self
    }

    /// Mark as executed automatically with a failure
    #[inline]
    #[must_use]
    pub fn executed_err(mut self, error: impl Into<String>) -> Self {
        self.executed = true;
        self.automated = true;
        self.error = Some(error.into());
        self
    }

    /// Record a suggestion without executing anything
    #[inline]
    #[must_use]
    pub fn suggestion(mut self, detail: impl Into<String>) -> Self {
        self.executed = false;
        self.automated = false;
        self.result = Some(detail.into());
        self
    }

    /// Whether the action ran and produced a success result
    #[inline]
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.executed && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_starts_unexecuted() {
        let action = HealingAction::new(HealingKind::Fix, "src/app.ts", "patch syntax");
        assert!(!action.executed);
        assert!(!action.succeeded());
    }

    #[test]
    fn executed_ok_marks_success() {
        let action = HealingAction::new(HealingKind::Create, "README.md", "placeholder")
            .executed_ok("created");
        assert!(action.executed);
        assert!(action.automated);
        assert!(action.succeeded());
    }

    #[test]
    fn executed_err_is_not_success() {
        let action = HealingAction::new(HealingKind::Update, "deps", "reinstall")
            .executed_err("npm unavailable");
        assert!(action.executed);
        assert!(!action.succeeded());
    }

    #[test]
    fn suggestion_does_not_execute() {
        let action = HealingAction::new(HealingKind::Fix, "tests", "review assertions")
            .suggestion("2 failing tests need manual review");
        assert!(!action.executed);
        assert!(action.result.is_some());
    }
}
