//! Test doubles for the tool boundary
//!
//! [`ScriptedInvoker`] answers tool calls from canned outcomes and records
//! every call it sees, so engine tests can assert both behavior and tool
//! traffic without touching a filesystem or a network.

use std::collections::HashMap;
use std::collections::VecDeque;

use parking_lot::Mutex;
use pva_tools::{ToolInvoker, ToolName, ToolOutcome};
use serde_json::{json, Value};

/// A recorded tool call
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Which tool was invoked
    pub tool: ToolName,
    /// The payload it received
    pub payload: Value,
}

#[derive(Default)]
struct Script {
    queued: HashMap<ToolName, VecDeque<ToolOutcome>>,
    defaults: HashMap<ToolName, ToolOutcome>,
    calls: Vec<RecordedCall>,
}

/// Invoker that replays scripted outcomes
///
/// Resolution order per tool: queued one-shot outcomes first (in enqueue
/// order), then the per-tool default, then a generic failure. Every call is
/// recorded regardless of how it resolves.
#[derive(Default)]
pub struct ScriptedInvoker {
    script: Mutex<Script>,
}

impl ScriptedInvoker {
    /// Empty script: every call fails until scripted
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default outcome for `tool`
    pub fn respond(&self, tool: ToolName, outcome: ToolOutcome) {
        self.script.lock().defaults.insert(tool, outcome);
    }

    /// Queue a one-shot outcome for `tool`, consumed before the default
    pub fn enqueue(&self, tool: ToolName, outcome: ToolOutcome) {
        self.script
            .lock()
            .queued
            .entry(tool)
            .or_default()
            .push_back(outcome);
    }

    /// How many times `tool` was invoked
    #[must_use]
    pub fn calls(&self, tool: ToolName) -> usize {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.tool == tool)
            .count()
    }

    /// Payloads `tool` received, in call order
    #[must_use]
    pub fn payloads(&self, tool: ToolName) -> Vec<Value> {
        self.script
            .lock()
            .calls
            .iter()
            .filter(|c| c.tool == tool)
            .map(|c| c.payload.clone())
            .collect()
    }

    /// Every recorded call, in order
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedCall> {
        self.script.lock().calls.clone()
    }
}

#[async_trait::async_trait]
impl ToolInvoker for ScriptedInvoker {
    async fn invoke(&self, tool: ToolName, payload: Value) -> ToolOutcome {
        let mut script = self.script.lock();
        script.calls.push(RecordedCall { tool, payload });
        if let Some(outcome) = script.queued.get_mut(&tool).and_then(VecDeque::pop_front) {
            return outcome;
        }
        match script.defaults.get(&tool) {
            Some(outcome) => outcome.clone(),
            None => ToolOutcome::err(format!("no scripted response for {tool}")),
        }
    }
}

/// Canned `validate_project` output in the formatted-text shape engines parse
#[must_use]
pub fn validation_text(passed: bool, errors: &[&str], warnings: &[&str]) -> ToolOutcome {
    let mut text = if passed {
        "Validation PASSED\n".to_string()
    } else {
        "Validation FAILED\n".to_string()
    };
    if !errors.is_empty() {
        text.push_str("Errors:\n");
        for error in errors {
            text.push_str("- ");
            text.push_str(error);
            text.push('\n');
        }
    }
    if !warnings.is_empty() {
        text.push_str("Warnings:\n");
        for warning in warnings {
            text.push_str("- ");
            text.push_str(warning);
            text.push('\n');
        }
    }
    ToolOutcome::ok(json!(text))
}
