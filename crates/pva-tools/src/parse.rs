//! Parser for the `validate_project` free-text output
//!
//! The tool answers with formatted text using fixed markers: a status line
//! containing PASSED or FAILED, an `Execution time: <n>ms` line, and bulleted
//! `Errors:` / `Warnings:` sections. The brittleness of that round-trip is
//! quarantined here: everything downstream works against the typed
//! [`ParsedValidation`] struct and never re-parses text.

use once_cell::sync::Lazy;
use regex::Regex;

static EXECUTION_TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Execution time:\s*(\d+)\s*ms").expect("valid regex"));

/// Typed view of one `validate_project` answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedValidation {
    /// Whether a status line said PASSED (FAILED and missing both count as false)
    pub passed: bool,
    /// Milliseconds reported on the execution-time line, 0 when absent
    pub execution_time_ms: u64,
    /// Items of the `Errors:` section
    pub errors: Vec<String>,
    /// Items of the `Warnings:` section
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Errors,
    Warnings,
}

/// Parse the formatted text emitted by `validate_project`
///
/// Unknown lines are ignored; a missing status line counts as failed so a
/// truncated answer can never masquerade as a pass.
#[must_use]
pub fn parse_validation_output(text: &str) -> ParsedValidation {
    let mut passed = false;
    let mut saw_status = false;
    let mut execution_time_ms = 0u64;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut section = Section::None;

    for raw in text.lines() {
        let line = raw.trim();

        if let Some(captures) = EXECUTION_TIME.captures(line) {
            execution_time_ms = captures[1].parse().unwrap_or(0);
            section = Section::None;
            continue;
        }

        // Status markers may share a line with other text ("Validation PASSED").
        if !saw_status && (line.contains("PASSED") || line.contains("FAILED")) {
            saw_status = true;
            passed = line.contains("PASSED") && !line.contains("FAILED");
            section = Section::None;
            continue;
        }

        if line.starts_with("Errors:") {
            section = Section::Errors;
            continue;
        }
        if line.starts_with("Warnings:") {
            section = Section::Warnings;
            continue;
        }

        if let Some(item) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match section {
                Section::Errors => errors.push(item.to_string()),
                Section::Warnings => warnings.push(item.to_string()),
                Section::None => {}
            }
            continue;
        }

        // A non-bullet, non-empty line ends the current section.
        if !line.is_empty() {
            section = Section::None;
        }
    }

    ParsedValidation {
        passed: passed && errors.is_empty(),
        execution_time_ms,
        errors,
        warnings,
    }
}
