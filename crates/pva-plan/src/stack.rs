//! Stack chooser
//!
//! One choice per category. A technology the exploration already saw wins
//! with confidence 0.9; otherwise the category default wins with 0.8. The
//! member tables are static data so the chooser is trivially deterministic.

use pva_report::{TechCategory, TechChoice};

/// Category members in preference order; the first entry is the default
const CATEGORY_MEMBERS: &[(TechCategory, &[&str])] = &[
    (
        TechCategory::Language,
        &["javascript", "typescript", "python", "rust", "go"],
    ),
    (TechCategory::Frontend, &["react", "vue"]),
    (TechCategory::Backend, &["node", "express", "django", "flask"]),
    (
        TechCategory::Database,
        &["postgresql", "mongodb", "mysql", "sqlite", "redis"],
    ),
    (TechCategory::Build, &["vite", "webpack", "docker"]),
    (TechCategory::Test, &["jest", "vitest", "mocha", "pytest"]),
];

/// Confidence for a technology the project already uses
const PRESENT_CONFIDENCE: f64 = 0.9;

/// Confidence for a conventional default
const DEFAULT_CONFIDENCE: f64 = 0.8;

fn choose_category(category: TechCategory, members: &[&str], seen: &[String]) -> TechChoice {
    let present = members
        .iter()
        .find(|m| seen.iter().any(|s| s.eq_ignore_ascii_case(m)));

    let (name, confidence, reasoning) = match present {
        Some(name) => (
            (*name).to_string(),
            PRESENT_CONFIDENCE,
            format!("{name} is already present in the project"),
        ),
        None => {
            let default = members[0];
            (
                default.to_string(),
                DEFAULT_CONFIDENCE,
                format!("no {category} signals found; {default} is the conventional default"),
            )
        }
    };

    let alternatives = members
        .iter()
        .filter(|m| **m != name)
        .map(|m| (*m).to_string())
        .collect();

    let tradeoffs = if present.is_some() {
        "keeps the existing setup; inherits its constraints".to_string()
    } else {
        "conventional pick for greenfield work; revisit once the codebase grows".to_string()
    };

    TechChoice {
        category,
        name,
        confidence,
        reasoning,
        alternatives,
        tradeoffs,
    }
}

/// Choose one technology per category given what exploration detected
#[must_use]
pub(crate) fn choose_stack(detected: &[String]) -> Vec<TechChoice> {
    CATEGORY_MEMBERS
        .iter()
        .map(|(category, members)| choose_category(*category, members, detected))
        .collect()
}
