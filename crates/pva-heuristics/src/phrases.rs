//! Verb-triggered phrase capture
//!
//! Visions are free text; requirements and features are the clauses that
//! contain an imperative trigger verb. The capture is deliberately shallow —
//! no grammar, just clause splitting plus a trigger table — so it stays
//! deterministic and cheap.

use pva_report::{MAX_FEATURES, MAX_REQUIREMENTS};
use serde::{Deserialize, Serialize};

/// What a captured phrase represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhraseTag {
    /// A requirement the result must satisfy
    Requirement,
    /// A feature to build
    Feature,
}

/// One captured phrase with its tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedPhrase {
    /// Classification of the phrase
    pub tag: PhraseTag,
    /// The captured clause, trimmed
    pub text: String,
}

/// Triggers that mark a clause as a requirement
const REQUIREMENT_TRIGGERS: &[&str] = &[
    "need", "needs", "must", "should", "require", "requires", "required", "implement", "add",
    "create",
];

/// Triggers that mark a clause as a feature
const FEATURE_TRIGGERS: &[&str] = &[
    "add", "create", "build", "implement", "support", "enable", "integrate", "provide", "allow",
    "make",
];

/// Default bounds on captured clause length, in characters
const MIN_PHRASE_LEN: usize = 5;
const MAX_PHRASE_LEN: usize = 100;

fn clauses(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c| matches!(c, '.' | '!' | '?' | ';' | '\n'))
        .map(str::trim)
        .filter(|c| !c.is_empty())
}

fn has_trigger(clause: &str, triggers: &[&str]) -> bool {
    clause
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .any(|word| {
            let word = word.to_lowercase();
            triggers.iter().any(|t| word == *t)
        })
}

/// Capture clauses of `text` that contain one of `triggers`
///
/// Clauses shorter than `min_len` or longer than `max_len` characters are
/// dropped; duplicates are removed; at most `cap` phrases are returned, in
/// input order.
#[must_use]
pub fn capture_phrases(
    text: &str,
    triggers: &[&str],
    min_len: usize,
    max_len: usize,
    cap: usize,
    tag: PhraseTag,
) -> Vec<TaggedPhrase> {
    let mut out: Vec<TaggedPhrase> = Vec::new();
    for clause in clauses(text) {
        if out.len() >= cap {
            break;
        }
        let len = clause.chars().count();
        if len < min_len || len > max_len {
            continue;
        }
        if !has_trigger(clause, triggers) {
            continue;
        }
        if out.iter().any(|p| p.text.eq_ignore_ascii_case(clause)) {
            continue;
        }
        out.push(TaggedPhrase {
            tag,
            text: clause.to_string(),
        });
    }
    out
}

/// Extract up to [`MAX_REQUIREMENTS`] requirements from a vision
#[must_use]
pub fn extract_requirements(vision: &str) -> Vec<String> {
    capture_phrases(
        vision,
        REQUIREMENT_TRIGGERS,
        MIN_PHRASE_LEN,
        MAX_PHRASE_LEN,
        MAX_REQUIREMENTS,
        PhraseTag::Requirement,
    )
    .into_iter()
    .map(|p| p.text)
    .collect()
}

/// Extract requirements with a relaxed minimum length
///
/// Used by the exploration healing pass when the normal capture found
/// nothing relevant.
#[must_use]
pub fn extract_requirements_relaxed(text: &str) -> Vec<String> {
    capture_phrases(
        text,
        REQUIREMENT_TRIGGERS,
        3,
        MAX_PHRASE_LEN,
        MAX_REQUIREMENTS,
        PhraseTag::Requirement,
    )
        .into_iter()
        .map(|p| p.text)
        .collect()
}

/// Extract up to [`MAX_FEATURES`] features from a vision
#[must_use]
pub fn extract_features(vision: &str) -> Vec<String> {
    capture_phrases(
        vision,
        FEATURE_TRIGGERS,
        MIN_PHRASE_LEN,
        MAX_PHRASE_LEN,
        MAX_FEATURES,
        PhraseTag::Feature,
    )
    .into_iter()
    .map(|p| p.text)
    .collect()
}

/// Fraction of `a`'s significant tokens that also occur in `b`
///
/// Tokens are lowercase alphanumeric words of three or more characters.
/// Returns 0 when `a` has no significant tokens.
#[must_use]
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let tokens = |s: &str| -> Vec<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() >= 3)
            .map(str::to_lowercase)
            .collect()
    };

    let a_tokens = tokens(a);
    if a_tokens.is_empty() {
        return 0.0;
    }
    let b_tokens = tokens(b);
    let hits = a_tokens.iter().filter(|t| b_tokens.contains(t)).count();
    hits as f64 / a_tokens.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn requirements_captured_by_trigger() {
        let vision = "We need user authentication. The UI looks nice. Must support exports.";
        let reqs = extract_requirements(vision);
        assert_eq!(
            reqs,
            vec![
                "We need user authentication".to_string(),
                "Must support exports".to_string(),
            ]
        );
    }

    #[test]
    fn short_and_long_clauses_dropped() {
        let long_tail = "x".repeat(120);
        let vision = format!("add. We must {long_tail}");
        let reqs = extract_requirements(&vision);
        assert!(reqs.is_empty());
    }

    #[test]
    fn requirement_cap_matches_the_report_limit() {
        let vision = (0..MAX_REQUIREMENTS + 5)
            .map(|i| format!("must handle case number {i}"))
            .collect::<Vec<_>>()
            .join(". ");
        assert_eq!(extract_requirements(&vision).len(), MAX_REQUIREMENTS);
    }

    #[test]
    fn duplicates_removed_case_insensitively() {
        let vision = "Must handle errors. must handle errors.";
        assert_eq!(extract_requirements(vision).len(), 1);
    }

    #[test]
    fn trigger_must_be_whole_word() {
        // "madden" contains "add" but is not the trigger word
        let reqs = extract_requirements("The madden engine is nice");
        assert!(reqs.is_empty());
    }

    #[test]
    fn features_use_broader_triggers() {
        let vision = "Build a dashboard, and enable dark mode. Support CSV import.";
        let features = extract_features(vision);
        assert_eq!(features.len(), 2);
        assert!(features[0].contains("dashboard"));
    }

    #[test]
    fn feature_cap_matches_the_report_limit() {
        let vision = (0..MAX_FEATURES + 5)
            .map(|i| format!("add widget number {i}"))
            .collect::<Vec<_>>()
            .join(". ");
        assert_eq!(extract_features(&vision).len(), MAX_FEATURES);
    }

    #[test]
    fn token_overlap_full_and_none() {
        assert_eq!(token_overlap("user auth", "add user auth flow"), 1.0);
        assert_eq!(token_overlap("dashboard", "payment gateway"), 0.0);
        assert_eq!(token_overlap("", "anything"), 0.0);
    }

    #[test]
    fn token_overlap_ignores_short_words() {
        // "a" and "of" are below the 3-char token floor
        let overlap = token_overlap("a map of routes", "routes map");
        assert_eq!(overlap, 1.0);
    }

    #[test]
    fn determinism_same_input_same_output() {
        let vision = "must do a thing. add another thing. build more things.";
        assert_eq!(extract_requirements(vision), extract_requirements(vision));
        assert_eq!(extract_features(vision), extract_features(vision));
    }
}
