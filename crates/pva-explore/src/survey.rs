//! Interpreting tool results during the survey
//!
//! `get_project_tree` implementations differ: some return a file list, some
//! a drawn text tree. Both shapes are accepted here and reduced to plain
//! relative paths.

use serde_json::Value;

/// Characters used by tree-drawing output that must be stripped from lines
const TREE_DRAWING: &[char] = &['│', '├', '└', '─', '|', '`', '+'];

/// Extract file paths from a `get_project_tree` result
///
/// Accepts `{"files": [..]}`, a bare array of strings, `{"tree": "<text>"}`
/// or a bare string. Directory entries (trailing slash) are dropped.
pub(crate) fn collect_paths(value: &Value) -> Vec<String> {
    if let Some(files) = value.get("files").and_then(Value::as_array) {
        return files
            .iter()
            .filter_map(Value::as_str)
            .filter(|p| !p.is_empty() && !p.ends_with('/'))
            .map(str::to_string)
            .collect();
    }
    if let Some(files) = value.as_array() {
        return files
            .iter()
            .filter_map(Value::as_str)
            .filter(|p| !p.is_empty() && !p.ends_with('/'))
            .map(str::to_string)
            .collect();
    }
    let tree_text = value
        .get("tree")
        .and_then(Value::as_str)
        .or_else(|| value.as_str());
    match tree_text {
        Some(text) => paths_from_tree_text(text),
        None => Vec::new(),
    }
}

fn paths_from_tree_text(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_matches(|c: char| c.is_whitespace() || TREE_DRAWING.contains(&c)))
        .filter(|line| !line.is_empty() && !line.ends_with('/'))
        .map(str::to_string)
        .collect()
}

/// Human-readable structure summary for the report
pub(crate) fn render_structure(value: &Value, paths: &[String]) -> String {
    if let Some(tree) = value.get("tree").and_then(Value::as_str) {
        return tree.to_string();
    }
    if let Some(tree) = value.as_str() {
        return tree.to_string();
    }
    paths.join("\n")
}

/// Extract `(path, content)` from one `read_files` result
///
/// Accepts `{"files": [{"path", "content"}]}` or a bare
/// `{"path", "content"}` object. Returns `None` when no content is present.
pub(crate) fn first_file_content(value: &Value) -> Option<(String, String)> {
    let entry = value
        .get("files")
        .and_then(Value::as_array)
        .and_then(|a| a.first())
        .or(Some(value))?;
    let path = entry.get("path").and_then(Value::as_str)?;
    let content = entry.get("content").and_then(Value::as_str)?;
    Some((path.to_string(), content.to_string()))
}

/// Extract paths from a `run_command` result (stdout line per file)
pub(crate) fn paths_from_command(value: &Value) -> Vec<String> {
    let stdout = value
        .get("stdout")
        .and_then(Value::as_str)
        .or_else(|| value.as_str())
        .unwrap_or_default();
    stdout
        .lines()
        .map(|l| l.trim().trim_start_matches("./"))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
