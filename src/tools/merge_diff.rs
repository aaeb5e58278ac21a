//! GitLab merge request diff fetcher.
//!
//! Pages through `/projects/:id/merge_requests/:iid/diffs` following the
//! `X-Next-Page` header and joins every file diff into one text blob.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{parse_input, Tool, ToolError};
use crate::config::GitLabConfig;
use crate::constants::{DEFAULT_TIMEOUT_SECS, ENV_GITLAB_TOKEN, GITLAB_DIFFS_PER_PAGE};

pub struct MergeDiffTool {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl MergeDiffTool {
    pub fn new(config: &GitLabConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_base: api_base(&config.api_url),
            token: config.token.clone().filter(|t| !t.is_empty()),
        })
    }

    async fn fetch_page(
        &self,
        token: &str,
        input: &MergeDiffInput,
        page: u32,
    ) -> Result<(Vec<FileDiff>, Option<u32>), ToolError> {
        let url = format!(
            "{}/projects/{}/merge_requests/{}/diffs",
            self.api_base, input.project_id, input.merge_id
        );
        tracing::debug!(%url, page, "fetching merge request diffs");
        let response = self
            .client
            .get(&url)
            .header("PRIVATE-TOKEN", token)
            .query(&[("page", page), ("per_page", GITLAB_DIFFS_PER_PAGE)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Rejected(format!(
                "failed to get MR changes: GitLab returned {}: {}",
                status, body
            )));
        }

        let next_page = response
            .headers()
            .get("x-next-page")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        let diffs: Vec<FileDiff> = response.json().await?;
        Ok((diffs, next_page))
    }
}

/// Normalizes a GitLab URL to its REST root, appending `/api/v4` unless present.
fn api_base(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    if trimmed.ends_with("/api/v4") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/api/v4")
    }
}

#[derive(Deserialize)]
struct MergeDiffInput {
    project_id: u64,
    merge_id: u64,
}

#[derive(Deserialize)]
struct FileDiff {
    #[serde(default)]
    diff: String,
}

#[async_trait::async_trait]
impl Tool for MergeDiffTool {
    fn name(&self) -> &str {
        "get_merge_diff"
    }

    fn description(&self) -> &str {
        "Get the diff of a GitLab merge request."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_id": {
                    "type": "integer",
                    "description": "GitLab project id."
                },
                "merge_id": {
                    "type": "integer",
                    "description": "GitLab merge request id (iid) within the project."
                }
            },
            "required": ["project_id", "merge_id"],
            "additionalProperties": false
        })
    }

    async fn execute(&self, input: Value) -> Result<String, ToolError> {
        let input: MergeDiffInput = parse_input(input)?;
        let token = self.token.as_deref().ok_or_else(|| {
            ToolError::Rejected(format!("GitLab token not configured, set {ENV_GITLAB_TOKEN}"))
        })?;

        let mut diffs = Vec::new();
        let mut page = 1;
        loop {
            let (batch, next) = self.fetch_page(token, &input, page).await?;
            diffs.extend(batch.into_iter().map(|d| d.diff));
            match next {
                Some(n) if n > page => page = n,
                _ => break,
            }
        }
        Ok(diffs.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::api_base;

    #[test]
    fn api_base_appends_version_once() {
        assert_eq!(api_base("https://gitlab.com"), "https://gitlab.com/api/v4");
        assert_eq!(api_base("https://gitlab.com/"), "https://gitlab.com/api/v4");
        assert_eq!(
            api_base("https://git.example.com/api/v4/"),
            "https://git.example.com/api/v4"
        );
    }
}
