//! Vision-level heuristics: non-functional requirements, integrations,
//! complexity scoring

/// Keyword → fixed sentence map for non-functional requirements
const NON_FUNCTIONAL: &[(&[&str], &str)] = &[
    (
        &["fast", "performance", "speed", "latency"],
        "Performance: the system should respond quickly under typical load",
    ),
    (
        &["secure", "security", "auth", "login", "encrypt"],
        "Security: protect user data and authenticate access",
    ),
    (
        &["scale", "scalable", "scalability", "concurrent", "load"],
        "Scalability: the system should handle growth in usage",
    ),
    (
        &["accessible", "accessibility", "a11y"],
        "Accessibility: interfaces should be usable by everyone",
    ),
    (
        &["reliable", "reliability", "robust", "resilient", "uptime"],
        "Reliability: the system should degrade gracefully on failure",
    ),
];

/// Always included, regardless of the vision text
const MAINTAINABILITY: &str = "Maintainability: code should be modular, documented and testable";

/// Integration keyword table
const INTEGRATIONS: &[(&str, &[&str])] = &[
    ("stripe", &["stripe"]),
    ("paypal", &["paypal"]),
    ("oauth", &["oauth", "sso", "single sign-on"]),
    ("google", &["google"]),
    ("github", &["github"]),
    ("slack", &["slack"]),
    ("email", &["email", "smtp", "sendgrid", "mailgun"]),
    ("aws", &["aws", "s3 bucket", "lambda"]),
    ("openai", &["openai", "gpt", "llm"]),
    ("twilio", &["twilio", "sms"]),
];

/// Keywords that push a vision toward the complex end
const HIGH_COMPLEXITY_KEYWORDS: &[&str] = &[
    "real-time",
    "realtime",
    "distributed",
    "microservice",
    "machine learning",
    "payment",
    "authentication",
    "migration",
    "concurrent",
    "websocket",
    "multi-tenant",
];

/// How rich the exploration evidence was, for complexity scoring
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplorationRichness {
    /// Detected technology count
    pub technologies: usize,
    /// Ranked key-file count
    pub key_files: usize,
}

/// Derive non-functional requirements from the vision
///
/// Maintainability is always the last entry.
#[must_use]
pub fn extract_non_functional(vision: &str) -> Vec<String> {
    let lowered = vision.to_lowercase();
    let mut out: Vec<String> = NON_FUNCTIONAL
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, sentence)| (*sentence).to_string())
        .collect();
    out.push(MAINTAINABILITY.to_string());
    out
}

/// Detect third-party integrations named in the vision
#[must_use]
pub fn extract_integrations(vision: &str) -> Vec<String> {
    let lowered = vision.to_lowercase();
    INTEGRATIONS
        .iter()
        .filter(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(name, _)| (*name).to_string())
        .collect()
}

/// Weighted complexity score for a vision plus exploration evidence
///
/// - +1 when the vision exceeds 200 characters, +1 more past 500
/// - +1 per high-complexity keyword hit, capped at 3
/// - +1 when exploration found 4 or more technologies
/// - +1 when exploration ranked 10 or more key files
///
/// Thresholds: 0–1 simple, 2–3 moderate, 4+ complex (mapping lives with the
/// planner).
#[must_use]
pub fn complexity_score(vision: &str, richness: ExplorationRichness) -> u32 {
    let mut score = 0u32;

    let len = vision.chars().count();
    if len > 200 {
        score += 1;
    }
    if len > 500 {
        score += 1;
    }

    let lowered = vision.to_lowercase();
    let keyword_hits = HIGH_COMPLEXITY_KEYWORDS
        .iter()
        .filter(|k| lowered.contains(*k))
        .count() as u32;
    score += keyword_hits.min(3);

    if richness.technologies >= 4 {
        score += 1;
    }
    if richness.key_files >= 10 {
        score += 1;
    }

    score
}
