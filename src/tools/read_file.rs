use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use super::{parse_input, resolve_in_root, Tool, ToolError};
use crate::constants::{BINARY_DETECTION_BYTES, READ_FILE_MAX_SIZE};

pub struct ReadFileTool {
    /// Paths are resolved relative to this directory and may not leave it.
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Deserialize)]
struct ReadFileInput {
    path: String,
}

#[async_trait::async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a given relative file path. Use this when you want to see \
what's inside a file. Do not use this with directory names."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The relative path of a file in the working directory."
                }
            },
            "required": ["path"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let input: ReadFileInput = parse_input(input)?;
        if input.path.trim().is_empty() {
            return Err(ToolError::InvalidArguments(
                "missing required parameter 'path'".into(),
            ));
        }
        let path = resolve_in_root(&self.root, &input.path)?;
        let context = || format!("error reading file '{}'", input.path);

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| ToolError::io(context(), e))?;
        if metadata.is_dir() {
            return Err(ToolError::Rejected(format!(
                "'{}' is a directory, use list_files instead",
                input.path
            )));
        }
        if metadata.len() > READ_FILE_MAX_SIZE {
            return Err(ToolError::Rejected(format!(
                "file too large: {} bytes (max {})",
                metadata.len(),
                READ_FILE_MAX_SIZE
            )));
        }

        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| ToolError::io(context(), e))?;
        let check_len = content.len().min(BINARY_DETECTION_BYTES);
        if content[..check_len].contains(&0) {
            return Err(ToolError::Rejected(
                "binary file detected, cannot display binary content".into(),
            ));
        }

        String::from_utf8(content)
            .map_err(|_| ToolError::Rejected(format!("'{}' is not valid UTF-8", input.path)))
    }
}
