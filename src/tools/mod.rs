pub mod list_files;
pub mod merge_diff;
pub mod read_file;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::GitLabConfig;
use crate::error::RegistryError;

use list_files::ListFilesTool;
use merge_diff::MergeDiffTool;
use read_file::ReadFileTool;

/// Why a tool invocation failed. The message is shown to the model, not the operator.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Definition sent to the model so it knows what tools are available.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool.
    fn name(&self) -> &str;

    /// Natural-language description the model uses to decide when to call it.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with already-parsed JSON input.
    async fn execute(&self, input: Value) -> Result<String, ToolError>;
}

/// Deserializes a tool's typed input, mapping failures to [`ToolError::InvalidArguments`].
pub(crate) fn parse_input<T: DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::InvalidArguments(e.to_string()))
}

/// Resolve the relative `path` against `root` and reject anything that escapes it.
pub(crate) fn resolve_in_root(root: &Path, path: &str) -> Result<PathBuf, ToolError> {
    if Path::new(path).is_absolute() {
        return Err(ToolError::Rejected(format!(
            "absolute paths are not allowed, use a path relative to the working directory: {}",
            path
        )));
    }
    let canonical = root
        .join(path)
        .canonicalize()
        .map_err(|e| ToolError::io(format!("cannot access '{}'", path), e))?;
    let root_canonical = root
        .canonicalize()
        .map_err(|e| ToolError::io("cannot access working directory", e))?;
    if !canonical.starts_with(&root_canonical) {
        return Err(ToolError::Rejected(format!(
            "path escapes the working directory: {}",
            path
        )));
    }
    Ok(canonical)
}

/// Holds all registered tools and resolves calls by name.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), RegistryError> {
        if self.lookup(tool.name()).is_some() {
            return Err(RegistryError::Duplicate(tool.name().to_string()));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Produce definitions for the model, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    #[cfg(test)]
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a registry with all built-in tools rooted at `project_root`.
    pub fn with_builtins(project_root: PathBuf, gitlab: &GitLabConfig) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(Box::new(ReadFileTool::new(project_root.clone())))?;
        registry.register(Box::new(ListFilesTool::new(project_root)))?;
        let merge_diff = MergeDiffTool::new(gitlab).map_err(|e| RegistryError::Setup {
            tool: "get_merge_diff",
            reason: e.to_string(),
        })?;
        registry.register(Box::new(merge_diff))?;
        Ok(registry)
    }
}
