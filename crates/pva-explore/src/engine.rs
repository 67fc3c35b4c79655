//! The exploration engine

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use pva_heuristics::{
    classify_path, detect_technologies, extract_requirements, rank_key_files, FileRank, FileSample,
};
use pva_report::{clamp_confidence, ExplorationReport, Phase, ReportId, MAX_KEY_FILES};
use pva_tools::{ToolInvoker, Tools};

use crate::{checkup, survey};

/// Confidence floor below which the pipeline loops back to exploration
const ADVANCE_THRESHOLD: f64 = 0.4;

/// Knobs for one exploration run
#[derive(Debug, Clone)]
pub struct ExplorationOptions {
    /// How many key files to read contents for
    pub max_files_to_read: usize,
    /// Run the validation battery after the survey
    pub enable_validation: bool,
    /// Attempt one bounded healing pass when validation fails
    pub enable_healing: bool,
}

impl Default for ExplorationOptions {
    fn default() -> Self {
        Self {
            max_files_to_read: 10,
            enable_validation: false,
            enable_healing: false,
        }
    }
}

/// Everything the survey learned, threaded through validation and healing
pub(crate) struct Findings {
    pub structure: String,
    pub structure_available: bool,
    pub paths: Vec<String>,
    pub key_files: Vec<String>,
    pub samples: Vec<FileSample>,
    pub technologies: Vec<String>,
    pub requirements: Vec<String>,
    pub files_read: usize,
    pub confidence: f64,
}

/// Surveys a directory against a vision and produces an
/// [`ExplorationReport`]
///
/// All side effects flow through the injected [`ToolInvoker`]; the engine
/// itself holds no mutable state between runs.
pub struct ExplorationEngine {
    invoker: Arc<dyn ToolInvoker>,
}

impl ExplorationEngine {
    /// Create an engine over an invoker
    #[inline]
    #[must_use]
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self { invoker }
    }

    /// Run the exploration phase
    ///
    /// Never fails: tool errors degrade the survey, and an internal defect
    /// yields [`ExplorationReport::degraded`].
    pub async fn execute(
        &self,
        dir: &str,
        vision: &str,
        options: &ExplorationOptions,
    ) -> ExplorationReport {
        match AssertUnwindSafe(self.run(dir, vision, options))
            .catch_unwind()
            .await
        {
            Ok(report) => report,
            Err(_) => {
                tracing::error!("exploration aborted unexpectedly, emitting degraded report");
                ExplorationReport::degraded("exploration aborted unexpectedly")
            }
        }
    }

    async fn run(&self, dir: &str, vision: &str, options: &ExplorationOptions) -> ExplorationReport {
        let tools = Tools::new(self.invoker.as_ref());
        tracing::info!(dir, "exploration started");

        let (structure, structure_available, paths) = match tools.project_tree(dir).await {
            Ok(value) => {
                let paths = survey::collect_paths(&value);
                (survey::render_structure(&value, &paths), true, paths)
            }
            Err(err) => {
                tracing::warn!(error = %err, "structure probe failed, surveying without a tree");
                ("(project structure unavailable)".to_string(), false, Vec::new())
            }
        };

        let key_files = rank_key_files(&paths, MAX_KEY_FILES);

        // Read the top-ranked files concurrently; the result order matches
        // the request order, so contents attach to the right sample.
        let to_read: Vec<&String> = key_files.iter().take(options.max_files_to_read).collect();
        let reads = join_all(
            to_read
                .iter()
                .map(|path| tools.read_files(dir, std::slice::from_ref(*path))),
        )
        .await;

        let mut samples: Vec<FileSample> = key_files.iter().map(FileSample::path_only).collect();
        let mut files_read = 0;
        for (path, outcome) in to_read.iter().zip(reads) {
            match outcome.map(|value| survey::first_file_content(&value)) {
                Ok(Some((_, content))) => {
                    if let Some(sample) = samples.iter_mut().find(|s| s.path == **path) {
                        sample.content = content;
                        files_read += 1;
                    }
                }
                Ok(None) => tracing::debug!(path = %path, "read returned no content"),
                Err(err) => {
                    tracing::debug!(path = %path, error = %err, "file read failed, keeping path-only sample");
                }
            }
        }

        let technologies = detect_technologies(&samples);
        let requirements = extract_requirements(vision);

        let mut findings = Findings {
            structure,
            structure_available,
            paths,
            key_files,
            samples,
            technologies,
            requirements,
            files_read,
            confidence: 0.0,
        };
        findings.confidence = base_confidence(&findings);

        let (validation, healing) = if options.enable_validation {
            let (summary, healing) =
                checkup::validate_and_heal(&tools, dir, vision, &mut findings, options.enable_healing)
                    .await;
            let passed_finally = healing
                .as_ref()
                .map_or(summary.passed, |h| h.passed_after);
            let adjustment = if passed_finally { 0.1 } else { -0.2 };
            findings.confidence = clamp_confidence(findings.confidence + adjustment);
            (Some(summary), healing)
        } else {
            (None, None)
        };

        // Without file contents the survey is path names only; never claim
        // more than middling confidence from that.
        if findings.files_read == 0 {
            findings.confidence = findings.confidence.min(0.5);
        }

        let next_phase = if findings.confidence >= ADVANCE_THRESHOLD {
            Phase::Plan
        } else {
            Phase::Explore
        };

        tracing::info!(
            confidence = findings.confidence,
            technologies = findings.technologies.len(),
            files_read = findings.files_read,
            next = %next_phase,
            "exploration finished"
        );

        let recommendations = recommendations(&findings);
        ExplorationReport {
            id: ReportId::new(),
            created_at: Utc::now(),
            project_structure: findings.structure,
            structure_available: findings.structure_available,
            recommendations,
            key_files: findings.key_files,
            technologies: findings.technologies,
            requirements: findings.requirements,
            files_read: findings.files_read,
            confidence: findings.confidence,
            next_phase,
            validation,
            healing,
        }
    }
}

/// Additive confidence ladder over the survey facts
pub(crate) fn base_confidence(findings: &Findings) -> f64 {
    let mut confidence = 0.3;
    if findings.paths.len() >= 5 {
        confidence += 0.2;
    }
    if findings.key_files.len() >= 3 {
        confidence += 0.2;
    }
    if findings.technologies.len() >= 2 {
        confidence += 0.2;
    }
    if !findings.requirements.is_empty() {
        confidence += 0.1;
    }
    clamp_confidence(confidence)
}

fn no_manifest(findings: &Findings) -> bool {
    !findings
        .paths
        .iter()
        .any(|p| classify_path(p) == FileRank::Manifest)
}

fn no_tests(findings: &Findings) -> bool {
    !findings
        .paths
        .iter()
        .any(|p| classify_path(p) == FileRank::Tests)
}

fn no_docs(findings: &Findings) -> bool {
    !findings
        .paths
        .iter()
        .any(|p| classify_path(p) == FileRank::Docs)
}

fn no_technologies(findings: &Findings) -> bool {
    findings.technologies.is_empty()
}

fn thin_structure(findings: &Findings) -> bool {
    findings.paths.len() < 5
}

/// Recommendation rule table; fires in order, wording is fixed
const RECOMMENDATION_RULES: &[(fn(&Findings) -> bool, &str)] = &[
    (
        no_manifest,
        "Add a package manifest so dependencies and scripts are declared",
    ),
    (no_tests, "No test files found; plan a testing step early"),
    (no_docs, "Add a README describing the project"),
    (
        no_technologies,
        "No stack signals detected; read more files before planning",
    ),
    (
        thin_structure,
        "Sparse structure; treat this as a greenfield build",
    ),
];

fn recommendations(findings: &Findings) -> Vec<String> {
    RECOMMENDATION_RULES
        .iter()
        .filter(|(applies, _)| applies(findings))
        .map(|(_, text)| (*text).to_string())
        .collect()
}
