//! Conventional layout, static dependency lookup, plan skeleton, validation
//! rules and risks
//!
//! All of it is table-driven: no registry resolution, no branching chains.

use pva_report::{
    Complexity, DependencySet, FailureAction, FileStructure, ImplementationStep, Risk,
    RiskCategory, RiskLevel, RiskOwner, StepComplexity, StepPhase, StepPriority, TechCategory,
    TechChoice, ValidationKind, ValidationRule,
};

/// Language → (manifest, directories, starter files)
const LANGUAGE_LAYOUT: &[(&str, &str, &[&str], &[&str])] = &[
    (
        "typescript",
        "package.json",
        &["src", "src/components", "tests"],
        &["package.json", "tsconfig.json", "src/index.ts", "README.md"],
    ),
    (
        "javascript",
        "package.json",
        &["src", "src/components", "tests"],
        &["package.json", "src/index.js", "README.md"],
    ),
    (
        "python",
        "pyproject.toml",
        &["src", "tests"],
        &["pyproject.toml", "src/main.py", "README.md"],
    ),
    (
        "rust",
        "Cargo.toml",
        &["src"],
        &["Cargo.toml", "src/main.rs", "README.md"],
    ),
    (
        "go",
        "go.mod",
        &["cmd"],
        &["go.mod", "cmd/main.go", "README.md"],
    ),
];

/// Technology → (runtime packages, dev packages)
const PACKAGE_TABLE: &[(&str, &[&str], &[&str])] = &[
    ("typescript", &[], &["typescript", "@types/node"]),
    ("react", &["react", "react-dom"], &[]),
    ("vue", &["vue"], &[]),
    ("express", &["express"], &[]),
    ("node", &[], &[]),
    ("postgresql", &["pg"], &[]),
    ("mongodb", &["mongoose"], &[]),
    ("mysql", &["mysql2"], &[]),
    ("sqlite", &["better-sqlite3"], &[]),
    ("redis", &["redis"], &[]),
    ("vite", &[], &["vite"]),
    ("webpack", &[], &["webpack", "webpack-cli"]),
    ("jest", &[], &["jest"]),
    ("vitest", &[], &["vitest"]),
    ("mocha", &[], &["mocha"]),
    ("tailwind", &[], &["tailwindcss"]),
];

/// Per-language commands: (compiler check, lint, test, build)
///
/// An empty compiler entry means the language has no blocking compile check.
const LANGUAGE_COMMANDS: &[(&str, &str, &str, &str, &str)] = &[
    ("typescript", "npx tsc --noEmit", "npx eslint .", "npm test", "npm run build"),
    ("javascript", "", "npx eslint .", "npm test", "npm run build"),
    ("python", "", "ruff check .", "pytest", "python -m build"),
    ("rust", "cargo check", "cargo clippy", "cargo test", "cargo build"),
    ("go", "go vet ./...", "gofmt -l .", "go test ./...", "go build ./..."),
];

fn layout_row(language: &str) -> &'static (&'static str, &'static str, &'static [&'static str], &'static [&'static str]) {
    LANGUAGE_LAYOUT
        .iter()
        .find(|(name, ..)| *name == language)
        .unwrap_or(&LANGUAGE_LAYOUT[1])
}

/// Manifest file name for a language
#[must_use]
pub(crate) fn manifest_for(language: &str) -> String {
    layout_row(language).1.to_string()
}

/// Conventional layout for the chosen language
#[must_use]
pub(crate) fn file_structure(language: &str) -> FileStructure {
    let (_, _, dirs, files) = layout_row(language);
    FileStructure {
        directories: dirs.iter().map(|d| (*d).to_string()).collect(),
        files: files.iter().map(|f| (*f).to_string()).collect(),
    }
}

/// Resolve packages for the chosen stack from the static table
#[must_use]
pub(crate) fn resolve_dependencies(stack: &[TechChoice]) -> DependencySet {
    let mut set = DependencySet::default();
    for choice in stack {
        if let Some((_, runtime, dev)) = PACKAGE_TABLE
            .iter()
            .find(|(name, ..)| name.eq_ignore_ascii_case(&choice.name))
        {
            for package in *runtime {
                if !set.runtime.contains(&(*package).to_string()) {
                    set.runtime.push((*package).to_string());
                }
            }
            for package in *dev {
                if !set.dev.contains(&(*package).to_string()) {
                    set.dev.push((*package).to_string());
                }
            }
        }
    }

    let language = stack
        .iter()
        .find(|c| c.category == TechCategory::Language)
        .map(|c| c.name.as_str())
        .unwrap_or("javascript");
    if matches!(language, "typescript" | "javascript") && !set.dev.contains(&"eslint".to_string())
    {
        set.dev.push("eslint".to_string());
    }
    set
}

fn step_complexity(overall: Complexity) -> StepComplexity {
    match overall {
        Complexity::Simple => StepComplexity::Simple,
        Complexity::Moderate => StepComplexity::Moderate,
        Complexity::Complex => StepComplexity::Complex,
    }
}

/// Mandatory setup → core-features → testing → documentation skeleton
#[must_use]
pub(crate) fn build_plan(
    features: &[String],
    complexity: Complexity,
    language: &str,
) -> Vec<ImplementationStep> {
    let core_deliverables: Vec<String> = if features.is_empty() {
        vec!["core implementation".to_string()]
    } else {
        features.iter().take(5).cloned().collect()
    };
    let core_estimate = 30 * core_deliverables.len() as u32;

    vec![
        ImplementationStep::new("setup", StepPhase::Setup, "scaffold the project")
            .with_priority(StepPriority::Critical)
            .with_deliverables(vec!["README.md".to_string(), manifest_for(language)])
            .with_estimate(20),
        ImplementationStep::new("core-features", StepPhase::Core, "implement the planned features")
            .depends_on("setup")
            .with_priority(StepPriority::High)
            .with_complexity(step_complexity(complexity))
            .with_deliverables(core_deliverables)
            .with_estimate(core_estimate),
        ImplementationStep::new("testing", StepPhase::Testing, "cover the features with tests")
            .depends_on("core-features")
            .with_priority(StepPriority::Medium)
            .with_deliverables(vec!["test-scaffold".to_string()])
            .with_estimate(25),
        ImplementationStep::new("documentation", StepPhase::Documentation, "document usage and decisions")
            .depends_on("core-features")
            .with_priority(StepPriority::Low)
            .with_deliverables(vec!["docs".to_string()])
            .with_estimate(15),
    ]
}

/// Planned validation battery for the chosen language
///
/// A blocking compiler check when the language has one, a warn-level
/// autofixable lint, a blocking test run and a blocking build.
#[must_use]
pub(crate) fn validation_rules(language: &str) -> Vec<ValidationRule> {
    let (_, compile, lint, test, build) = LANGUAGE_COMMANDS
        .iter()
        .find(|(name, ..)| *name == language)
        .unwrap_or(&LANGUAGE_COMMANDS[1]);

    let mut rules = Vec::with_capacity(4);
    if !compile.is_empty() {
        let kind = if language == "typescript" {
            ValidationKind::Typescript
        } else {
            ValidationKind::Custom
        };
        rules.push(ValidationRule {
            kind,
            command: (*compile).to_string(),
            failure_action: FailureAction::Block,
            auto_fix: false,
            priority: StepPriority::Critical,
        });
    }
    rules.push(ValidationRule {
        kind: ValidationKind::Eslint,
        command: (*lint).to_string(),
        failure_action: FailureAction::Warn,
        auto_fix: true,
        priority: StepPriority::Medium,
    });
    rules.push(ValidationRule {
        kind: ValidationKind::Test,
        command: (*test).to_string(),
        failure_action: FailureAction::Block,
        auto_fix: false,
        priority: StepPriority::High,
    });
    rules.push(ValidationRule {
        kind: ValidationKind::Build,
        command: (*build).to_string(),
        failure_action: FailureAction::Block,
        auto_fix: false,
        priority: StepPriority::High,
    });
    rules
}

/// Risk table over the chosen stack and the plan
#[must_use]
pub(crate) fn assess_risks(stack: &[TechChoice], plan: &[ImplementationStep]) -> Vec<Risk> {
    let mut risks = Vec::new();

    let average = if stack.is_empty() {
        0.0
    } else {
        stack.iter().map(|c| c.confidence).sum::<f64>() / stack.len() as f64
    };
    if average < 0.7 {
        risks.push(Risk {
            category: RiskCategory::StackUncertainty,
            description: "technology choices rest on weak exploration evidence".to_string(),
            probability: RiskLevel::Medium,
            impact: RiskLevel::Medium,
            mitigation: vec![
                "Read more project files before committing to the stack".to_string(),
                "Prefer technologies the project already uses".to_string(),
            ],
            owner: RiskOwner::Agent,
        });
    }

    if plan
        .iter()
        .any(|s| s.complexity == StepComplexity::Complex)
    {
        risks.push(Risk {
            category: RiskCategory::Complexity,
            description: "the plan contains complex steps".to_string(),
            probability: RiskLevel::Medium,
            impact: RiskLevel::High,
            mitigation: vec![
                "Split complex steps into smaller deliverables".to_string(),
                "Review the plan before execution".to_string(),
            ],
            owner: RiskOwner::Human,
        });
    }

    risks
}
