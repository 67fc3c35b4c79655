//! Technology detection from file names and contents
//!
//! A fixed, case-insensitive indicator table maps observed substrings to
//! technology names. Output order follows the table, so identical inputs
//! always yield identical technology lists.

/// A file path with whatever content was read for it (possibly empty)
#[derive(Debug, Clone, Default)]
pub struct FileSample {
    /// Path relative to the surveyed directory
    pub path: String,
    /// File content, empty when the file was not read
    pub content: String,
}

impl FileSample {
    /// Sample with a path only
    #[inline]
    #[must_use]
    pub fn path_only(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: String::new(),
        }
    }

    /// Sample with path and content
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Indicator table: technology → substrings that reveal it
///
/// Matched case-insensitively against both paths and contents. Order is the
/// output order.
const TECHNOLOGY_INDICATORS: &[(&str, &[&str])] = &[
    ("typescript", &["tsconfig", ".ts", "typescript"]),
    ("javascript", &["package.json", ".js", "javascript"]),
    ("react", &["react", ".jsx", ".tsx", "next.config"]),
    ("vue", &[".vue", "vue.config", "nuxt"]),
    ("node", &["package.json", "node_modules", "server.js"]),
    ("express", &["express"]),
    ("python", &["requirements.txt", "pyproject.toml", ".py", "django", "flask"]),
    ("rust", &["cargo.toml", ".rs", "fn main"]),
    ("go", &["go.mod", "package main"]),
    ("postgresql", &["postgres", "psql"]),
    ("mongodb", &["mongo"]),
    ("mysql", &["mysql"]),
    ("sqlite", &["sqlite"]),
    ("redis", &["redis"]),
    ("docker", &["dockerfile", "docker-compose"]),
    ("tailwind", &["tailwind"]),
    ("vite", &["vite.config", "vite"]),
    ("webpack", &["webpack"]),
    ("jest", &["jest"]),
    ("vitest", &["vitest"]),
    ("mocha", &["mocha"]),
    ("pytest", &["pytest"]),
];

/// Extension table for histogram-based inference (healing fallback)
const EXTENSION_TECHS: &[(&str, &[&str])] = &[
    ("ts", &["typescript"]),
    ("tsx", &["typescript", "react"]),
    ("js", &["javascript"]),
    ("jsx", &["react"]),
    ("vue", &["vue"]),
    ("py", &["python"]),
    ("rs", &["rust"]),
    ("go", &["go"]),
];

/// Detect technologies across `samples`
///
/// Returns deduplicated names in indicator-table order.
#[must_use]
pub fn detect_technologies(samples: &[FileSample]) -> Vec<String> {
    let lowered: Vec<(String, String)> = samples
        .iter()
        .map(|s| (s.path.to_lowercase(), s.content.to_lowercase()))
        .collect();

    let mut out = Vec::new();
    for (tech, indicators) in TECHNOLOGY_INDICATORS {
        let found = lowered.iter().any(|(path, content)| {
            indicators
                .iter()
                .any(|needle| path.contains(needle) || content.contains(needle))
        });
        if found {
            out.push((*tech).to_string());
        }
    }
    out
}

/// Infer technologies from file extensions alone
///
/// Builds an extension histogram over `paths` and keeps technologies whose
/// extensions occur at least twice; when nothing reaches that bar, single
/// occurrences count. Used by exploration healing when indicator detection
/// came up empty.
#[must_use]
pub fn infer_from_extensions(paths: &[String]) -> Vec<String> {
    let count_for = |ext: &str| -> usize {
        paths
            .iter()
            .filter(|p| {
                p.rsplit('.')
                    .next()
                    .is_some_and(|e| e.eq_ignore_ascii_case(ext) && e.len() < p.len())
            })
            .count()
    };

    let mut strong = Vec::new();
    let mut weak = Vec::new();
    for (ext, techs) in EXTENSION_TECHS {
        let count = count_for(ext);
        let bucket = match count {
            0 => continue,
            1 => &mut weak,
            _ => &mut strong,
        };
        for tech in *techs {
            if !bucket.contains(&(*tech).to_string()) {
                bucket.push((*tech).to_string());
            }
        }
    }

    if strong.is_empty() {
        weak
    } else {
        strong
    }
}
