use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{parse_input, resolve_in_root, Tool, ToolError};
use crate::constants::LIST_FILES_MAX_ENTRIES;

pub struct ListFilesTool {
    root: PathBuf,
}

impl ListFilesTool {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

#[derive(Deserialize, Default)]
struct ListFilesInput {
    #[serde(default)]
    path: Option<String>,
}

/// Entries found by [`walk`]. `truncated` is set when the cap cut the walk short.
struct Listing {
    entries: Vec<String>,
    truncated: bool,
}

/// Walk `dir` recursively, stopping after `limit` entries. Entries are
/// relative to `dir`, `/`-separated, sorted, and directories end with `/`.
/// `.git` is skipped.
fn walk(dir: &Path, limit: usize) -> Result<Listing, ToolError> {
    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        if entries.len() >= limit {
            return Ok(Listing {
                entries,
                truncated: true,
            });
        }
        let entry = entry.map_err(|e| {
            let context = format!("error listing '{}'", dir.display());
            match e.into_io_error() {
                Some(io) => ToolError::io(context, io),
                None => ToolError::Rejected(format!("{context}: filesystem loop detected")),
            }
        })?;
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        let mut name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if entry.file_type().is_dir() {
            name.push('/');
        }
        entries.push(name);
    }
    Ok(Listing {
        entries,
        truncated: false,
    })
}

#[async_trait::async_trait]
impl Tool for ListFilesTool {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories at a given path. If no path is provided, lists files in \
the current directory. Returns a JSON array of strings, directories have a trailing slash. \
At most 1000 entries are returned; list a subdirectory to see the rest of a larger tree."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Optional relative path to list files from. Defaults to current directory if not provided."
                }
            },
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let input: ListFilesInput = if input.is_null() {
            ListFilesInput::default()
        } else {
            parse_input(input)?
        };
        let requested = input
            .path
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| ".".to_string());
        let dir = resolve_in_root(&self.root, &requested)?;
        if !dir.is_dir() {
            return Err(ToolError::Rejected(format!(
                "'{}' is not a directory",
                requested
            )));
        }

        let listing = tokio::task::spawn_blocking(move || walk(&dir, LIST_FILES_MAX_ENTRIES))
            .await
            .map_err(|e| ToolError::Rejected(format!("directory walk aborted: {e}")))??;
        if listing.truncated {
            tracing::warn!(
                path = %requested,
                limit = LIST_FILES_MAX_ENTRIES,
                "list_files output truncated"
            );
        }

        serde_json::to_string(&listing.entries)
            .map_err(|e| ToolError::Rejected(format!("failed to encode file list: {e}")))
    }
}
