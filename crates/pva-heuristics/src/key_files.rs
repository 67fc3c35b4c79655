//! Key-file ranking
//!
//! A fixed priority ladder orders survey candidates:
//! manifest > config > entry-point > docs > tests > everything else.
//! Ties break on path, so ranking is deterministic for any input order.

/// Ladder position of a path, lower is more important
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileRank {
    /// Package/build manifest
    Manifest,
    /// Configuration file
    Config,
    /// Program entry point
    EntryPoint,
    /// Documentation
    Docs,
    /// Test code
    Tests,
    /// Anything else
    Other,
}

const MANIFEST_NAMES: &[&str] = &[
    "package.json",
    "cargo.toml",
    "pyproject.toml",
    "go.mod",
    "requirements.txt",
    "gemfile",
    "pom.xml",
    "composer.json",
];

const ENTRY_NAMES: &[&str] = &[
    "main.rs", "lib.rs", "main.py", "main.go", "index.js", "index.ts", "index.tsx", "app.js",
    "app.ts", "app.py", "server.js", "server.ts",
];

const CONFIG_SUFFIXES: &[&str] = &[".toml", ".yaml", ".yml", ".ini", ".env", ".json"];

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Classify one path on the ladder
#[must_use]
pub fn classify_path(path: &str) -> FileRank {
    let lowered = path.to_lowercase();
    let name = file_name(&lowered);

    if MANIFEST_NAMES.contains(&name) {
        return FileRank::Manifest;
    }
    if lowered.contains("test") || lowered.contains("spec") || lowered.starts_with("tests/") {
        return FileRank::Tests;
    }
    if name.starts_with("readme") || name.ends_with(".md") || lowered.starts_with("docs/") {
        return FileRank::Docs;
    }
    if ENTRY_NAMES.contains(&name) {
        return FileRank::EntryPoint;
    }
    if name.contains("config")
        || name.starts_with('.')
        || CONFIG_SUFFIXES.iter().any(|s| name.ends_with(s))
    {
        return FileRank::Config;
    }
    FileRank::Other
}

/// Rank paths by the ladder and keep the top `cap`
///
/// Sorting is by (rank, path); the input order never influences the result.
#[must_use]
pub fn rank_key_files(paths: &[String], cap: usize) -> Vec<String> {
    let mut ranked: Vec<(FileRank, &String)> =
        paths.iter().map(|p| (classify_path(p), p)).collect();
    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    ranked.into_iter().take(cap).map(|(_, p)| p.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ladder_ordering() {
        assert!(FileRank::Manifest < FileRank::Config);
        assert!(FileRank::Config < FileRank::EntryPoint);
        assert!(FileRank::EntryPoint < FileRank::Docs);
        assert!(FileRank::Docs < FileRank::Tests);
        assert!(FileRank::Tests < FileRank::Other);
    }

    #[test]
    fn classification_samples() {
        assert_eq!(classify_path("package.json"), FileRank::Manifest);
        assert_eq!(classify_path("backend/Cargo.toml"), FileRank::Manifest);
        assert_eq!(classify_path("vite.config.ts"), FileRank::Config);
        assert_eq!(classify_path(".gitignore"), FileRank::Config);
        assert_eq!(classify_path("src/main.rs"), FileRank::EntryPoint);
        assert_eq!(classify_path("README.md"), FileRank::Docs);
        assert_eq!(classify_path("tests/login_test.rs"), FileRank::Tests);
        assert_eq!(classify_path("src/widgets/button.rs"), FileRank::Other);
    }

    #[test]
    fn manifest_beats_generic_json() {
        // package.json is a manifest even though .json is a config suffix
        assert_eq!(classify_path("package.json"), FileRank::Manifest);
        assert_eq!(classify_path("settings.json"), FileRank::Config);
    }

    #[test]
    fn ranking_is_input_order_independent() {
        let a = vec![
            "src/util.rs".to_string(),
            "package.json".to_string(),
            "README.md".to_string(),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(rank_key_files(&a, 20), rank_key_files(&b, 20));
        assert_eq!(rank_key_files(&a, 20)[0], "package.json");
    }

    #[test]
    fn cap_is_honored() {
        let paths: Vec<String> = (0..40).map(|i| format!("src/file{i:02}.rs")).collect();
        assert_eq!(rank_key_files(&paths, 20).len(), 20);
    }
}
