//! Planning phase report and plan building blocks

use crate::phase::{Phase, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on extracted features
pub const MAX_FEATURES: usize = 20;

/// Overall vision complexity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Complexity {
    /// Small, single-concern change
    Simple,
    /// Several features or an established codebase
    Moderate,
    /// Many features, heavy keywords or a rich existing stack
    Complex,
}

/// Stack category a technology choice belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TechCategory {
    /// Primary implementation language
    Language,
    /// Frontend framework
    Frontend,
    /// Backend runtime/framework
    Backend,
    /// Database
    Database,
    /// Build tooling
    Build,
    /// Test runner
    Test,
}

impl std::fmt::Display for TechCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TechCategory::Language => "language",
            TechCategory::Frontend => "frontend",
            TechCategory::Backend => "backend",
            TechCategory::Database => "database",
            TechCategory::Build => "build",
            TechCategory::Test => "test",
        };
        write!(f, "{name}")
    }
}

/// One technology decision with its justification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechChoice {
    /// Category the choice fills
    pub category: TechCategory,
    /// Chosen technology name (lowercase)
    pub name: String,
    /// Chooser confidence: 0.9 when already present, 0.8 for defaults
    pub confidence: f64,
    /// Why this technology was picked
    pub reasoning: String,
    /// Other members of the category that were considered
    pub alternatives: Vec<String>,
    /// Known tradeoffs of the pick
    pub tradeoffs: String,
}

/// Conventional file/directory layout for the plan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileStructure {
    /// Directories to create
    pub directories: Vec<String>,
    /// Files to create
    pub files: Vec<String>,
}

/// Packages resolved from the static technology→package table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencySet {
    /// Runtime packages
    pub runtime: Vec<String>,
    /// Development-only packages
    pub dev: Vec<String>,
}

/// Plan skeleton phase a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepPhase {
    /// Project scaffolding
    Setup,
    /// Feature implementation
    Core,
    /// Test scaffolding and coverage
    Testing,
    /// Docs and summaries
    Documentation,
}

/// Step scheduling priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StepPriority {
    /// Must run first among ready steps
    Critical,
    /// Important
    High,
    /// Normal
    Medium,
    /// Can run last
    Low,
}

impl StepPriority {
    /// Scheduling weight: lower runs earlier among ready steps
    #[inline]
    #[must_use]
    pub fn weight(self) -> u8 {
        match self {
            StepPriority::Critical => 0,
            StepPriority::High => 1,
            StepPriority::Medium => 2,
            StepPriority::Low => 3,
        }
    }
}

/// Step implementation complexity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepComplexity {
    /// Mechanical change
    Simple,
    /// Requires some design
    Moderate,
    /// Requires careful design and review
    Complex,
}

/// A unit of planned work with declared dependencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationStep {
    /// Unique step id within the plan
    pub id: String,
    /// Skeleton phase the step belongs to
    pub phase: StepPhase,
    /// What the step does
    pub description: String,
    /// Ids of steps that must complete first
    pub dependencies: Vec<String>,
    /// Scheduling priority
    pub priority: StepPriority,
    /// Implementation complexity
    pub complexity: StepComplexity,
    /// Concrete outputs the step must produce
    pub deliverables: Vec<String>,
    /// Estimated effort in minutes, always > 0
    pub estimated_minutes: u32,
}

impl ImplementationStep {
    /// Create a step with no dependencies
    #[must_use]
    pub fn new(id: impl Into<String>, phase: StepPhase, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            phase,
            description: description.into(),
            dependencies: Vec::new(),
            priority: StepPriority::Medium,
            complexity: StepComplexity::Simple,
            deliverables: Vec::new(),
            estimated_minutes: 15,
        }
    }

    /// Add a dependency on another step id
    #[inline]
    #[must_use]
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.dependencies.push(id.into());
        self
    }

    /// Set priority
    #[inline]
    #[must_use]
    pub fn with_priority(mut self, priority: StepPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Set complexity
    #[inline]
    #[must_use]
    pub fn with_complexity(mut self, complexity: StepComplexity) -> Self {
        self.complexity = complexity;
        self
    }

    /// Set deliverables
    #[inline]
    #[must_use]
    pub fn with_deliverables(mut self, deliverables: Vec<String>) -> Self {
        self.deliverables = deliverables;
        self
    }

    /// Set estimated effort
    #[inline]
    #[must_use]
    pub fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes.max(1);
        self
    }
}

/// Validation battery member kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationKind {
    /// TypeScript compiler check
    Typescript,
    /// JavaScript syntax/lint check
    Javascript,
    /// ESLint
    Eslint,
    /// Test suite
    Test,
    /// Build
    Build,
    /// Project-specific checks
    Custom,
}

impl ValidationKind {
    /// Wire name used in `validate_project` payloads
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationKind::Typescript => "typescript",
            ValidationKind::Javascript => "javascript",
            ValidationKind::Eslint => "eslint",
            ValidationKind::Test => "test",
            ValidationKind::Build => "build",
            ValidationKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to do when a validation rule fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureAction {
    /// Failure blocks completion
    Block,
    /// Failure is recorded but not blocking
    Warn,
    /// Failure should be auto-fixed
    Fix,
}

/// One rule of the planned validation battery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    /// Battery kind
    pub kind: ValidationKind,
    /// Shell command that performs the check
    pub command: String,
    /// Behavior on failure
    pub failure_action: FailureAction,
    /// Whether the rule can fix itself
    pub auto_fix: bool,
    /// Rule priority
    pub priority: StepPriority,
}

/// Risk categories the planner can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    /// Technology choices rest on weak evidence
    StackUncertainty,
    /// The plan contains complex steps
    Complexity,
    /// The planner itself failed
    Technical,
}

/// Probability/impact level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Unlikely / minor
    Low,
    /// Possible / noticeable
    Medium,
    /// Likely / severe
    High,
}

/// Who owns the mitigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskOwner {
    /// The autonomous agent
    Agent,
    /// A single human reviewer
    Human,
    /// The whole team
    Team,
}

/// A planning risk with mitigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Risk {
    /// Risk category
    pub category: RiskCategory,
    /// What could go wrong
    pub description: String,
    /// How likely it is
    pub probability: RiskLevel,
    /// How bad it would be
    pub impact: RiskLevel,
    /// Mitigation steps
    pub mitigation: Vec<String>,
    /// Who owns the mitigation
    pub owner: RiskOwner,
}

/// Output of the planning phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningReport {
    /// Report identifier
    pub id: ReportId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Whether planning succeeded structurally
    pub success: bool,
    /// Vision complexity classification
    pub complexity: Complexity,
    /// Extracted features, at most [`MAX_FEATURES`]
    pub features: Vec<String>,
    /// Non-functional requirements (maintainability always present)
    pub non_functional: Vec<String>,
    /// Detected third-party integrations
    pub integrations: Vec<String>,
    /// One choice per stack category
    pub tech_stack: Vec<TechChoice>,
    /// Conventional layout derived from the stack
    pub file_structure: FileStructure,
    /// Statically resolved packages
    pub dependencies: DependencySet,
    /// Dependency-ordered implementation plan (acyclic, unique ids)
    pub implementation_plan: Vec<ImplementationStep>,
    /// Planned validation battery
    pub validation_criteria: Vec<ValidationRule>,
    /// Identified risks
    pub risks: Vec<Risk>,
    /// Heuristic reliability score in `[0.1, 1]`
    pub confidence: f64,
    /// Where the pipeline should go next (`Explore` or `Complete`)
    pub next_phase: Phase,
}

impl PlanningReport {
    /// Minimal failed report used when the phase fails internally
    #[must_use]
    pub fn failed(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            id: ReportId::new(),
            created_at: Utc::now(),
            success: false,
            complexity: Complexity::Simple,
            features: Vec::new(),
            non_functional: Vec::new(),
            integrations: Vec::new(),
            tech_stack: Vec::new(),
            file_structure: FileStructure::default(),
            dependencies: DependencySet::default(),
            implementation_plan: Vec::new(),
            validation_criteria: Vec::new(),
            risks: vec![Risk {
                category: RiskCategory::Technical,
                description: detail,
                probability: RiskLevel::High,
                impact: RiskLevel::High,
                mitigation: vec!["Re-run planning with a fresh exploration report".to_string()],
                owner: RiskOwner::Agent,
            }],
            confidence: 0.1,
            next_phase: Phase::Explore,
        }
    }

    /// Average confidence across the chosen stack, 0 when empty
    #[must_use]
    pub fn average_tech_confidence(&self) -> f64 {
        if self.tech_stack.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.tech_stack.iter().map(|t| t.confidence).sum();
        sum / self.tech_stack.len() as f64
    }

    /// Look up a stack choice by category
    #[must_use]
    pub fn choice(&self, category: TechCategory) -> Option<&TechChoice> {
        self.tech_stack.iter().find(|t| t.category == category)
    }
}
