//! The `ToolInvoker` trait and its typed payload wrapper

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Names of the tools every invoker must understand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    /// Tree-like structure dump of a directory
    GetProjectTree,
    /// Read file contents
    ReadFiles,
    /// Write file contents
    WriteFiles,
    /// Run a shell command
    RunCommand,
    /// Version-control operation
    GitOperation,
    /// Run a validation battery member, returns formatted text
    ValidateProject,
    /// Web search
    WebSearch,
}

impl ToolName {
    /// Wire name of the tool
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::GetProjectTree => "get_project_tree",
            ToolName::ReadFiles => "read_files",
            ToolName::WriteFiles => "write_files",
            ToolName::RunCommand => "run_command",
            ToolName::GitOperation => "git_operation",
            ToolName::ValidateProject => "validate_project",
            ToolName::WebSearch => "web_search",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_project_tree" => Ok(ToolName::GetProjectTree),
            "read_files" => Ok(ToolName::ReadFiles),
            "write_files" => Ok(ToolName::WriteFiles),
            "run_command" => Ok(ToolName::RunCommand),
            "git_operation" => Ok(ToolName::GitOperation),
            "validate_project" => Ok(ToolName::ValidateProject),
            "web_search" => Ok(ToolName::WebSearch),
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// Errors raised when working with the boundary
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The invoker reported a failure
    #[error("tool {tool} failed: {message}")]
    Failed {
        /// Which tool failed
        tool: ToolName,
        /// Invoker-supplied failure detail
        message: String,
    },

    /// The invoker reported success but the result is missing or malformed
    #[error("tool {tool} returned a malformed result: {message}")]
    MalformedResult {
        /// Which tool answered
        tool: ToolName,
        /// What was wrong with the result
        message: String,
    },

    /// A string did not name a known tool
    #[error("unknown tool name: {0}")]
    UnknownTool(String),
}

/// The `{success, result?, error?}` envelope every invocation returns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Whether the operation succeeded
    pub success: bool,
    /// Tool-specific result payload, present on success
    pub result: Option<Value>,
    /// Failure detail, present on failure
    pub error: Option<String>,
}

impl ToolOutcome {
    /// Successful outcome with a result payload
    #[inline]
    #[must_use]
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    /// Failed outcome with an error message
    #[inline]
    #[must_use]
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }

    /// Convert into a `Result`, attributing failures to `tool`
    ///
    /// A successful outcome with no payload yields `Value::Null`.
    pub fn into_result(self, tool: ToolName) -> Result<Value, ToolError> {
        if self.success {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(ToolError::Failed {
                tool,
                message: self.error.unwrap_or_else(|| "unspecified failure".to_string()),
            })
        }
    }
}

/// The single boundary through which all side effects flow
///
/// Implementations execute a named operation with a JSON payload. A timed-out
/// call must return a failed outcome, identical in shape to any other tool
/// failure — never hang and never panic.
#[async_trait::async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Execute `tool` with `payload`
    async fn invoke(&self, tool: ToolName, payload: Value) -> ToolOutcome;
}

/// Typed payload construction over a raw invoker
///
/// Keeps every payload shape in one place so engines never hand-build JSON.
#[derive(Clone, Copy)]
pub struct Tools<'a> {
    invoker: &'a dyn ToolInvoker,
}

impl<'a> Tools<'a> {
    /// Wrap an invoker
    #[inline]
    #[must_use]
    pub fn new(invoker: &'a dyn ToolInvoker) -> Self {
        Self { invoker }
    }

    /// Raw invocation, for payloads not covered by the typed helpers
    pub async fn invoke(&self, tool: ToolName, payload: Value) -> ToolOutcome {
        tracing::debug!(tool = %tool, "invoking tool");
        let outcome = self.invoker.invoke(tool, payload).await;
        if !outcome.success {
            tracing::warn!(
                tool = %tool,
                error = outcome.error.as_deref().unwrap_or("unspecified"),
                "tool invocation failed"
            );
        }
        outcome
    }

    /// Fetch the tree-like structure dump of `dir`
    pub async fn project_tree(&self, dir: &str) -> Result<Value, ToolError> {
        self.invoke(ToolName::GetProjectTree, json!({ "dir": dir }))
            .await
            .into_result(ToolName::GetProjectTree)
    }

    /// Fetch a deeper structure dump, used by exploration healing
    pub async fn project_tree_deep(&self, dir: &str) -> Result<Value, ToolError> {
        self.invoke(
            ToolName::GetProjectTree,
            json!({ "dir": dir, "max_depth": 5, "include_hidden": true }),
        )
        .await
        .into_result(ToolName::GetProjectTree)
    }

    /// Read the contents of `paths` relative to `dir`
    pub async fn read_files(&self, dir: &str, paths: &[String]) -> Result<Value, ToolError> {
        self.invoke(ToolName::ReadFiles, json!({ "dir": dir, "paths": paths }))
            .await
            .into_result(ToolName::ReadFiles)
    }

    /// Write one file; `files` entries are `{path, content}` pairs
    pub async fn write_files(&self, dir: &str, files: Value) -> Result<Value, ToolError> {
        self.invoke(ToolName::WriteFiles, json!({ "dir": dir, "files": files }))
            .await
            .into_result(ToolName::WriteFiles)
    }

    /// Run a shell command in `dir`
    pub async fn run_command(&self, dir: &str, command: &str) -> Result<Value, ToolError> {
        self.invoke(ToolName::RunCommand, json!({ "dir": dir, "command": command }))
            .await
            .into_result(ToolName::RunCommand)
    }

    /// Version-control operation in `dir`
    pub async fn git(&self, dir: &str, op: &str, args: Value) -> Result<Value, ToolError> {
        self.invoke(ToolName::GitOperation, json!({ "dir": dir, "op": op, "args": args }))
            .await
            .into_result(ToolName::GitOperation)
    }

    /// Run one validation battery member; the result is formatted text
    pub async fn validate_project(&self, dir: &str, kind: &str) -> Result<Value, ToolError> {
        self.invoke(ToolName::ValidateProject, json!({ "dir": dir, "type": kind }))
            .await
            .into_result(ToolName::ValidateProject)
    }
}
