//! Struct definitions for relay configuration.
//!
//! [`ConfigFile`] is what a TOML file may contain: every field optional so a
//! project file can override just one setting. [`Config`] is the resolved
//! value handed to the rest of the program.

use serde::Deserialize;

/// One configuration file layer (`relay.toml` or the global `config.toml`).
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Chat-completions base URL, without the `/v1/chat/completions` path.
    pub base_url: Option<String>,
    /// API key for the completion endpoint. Usually `{env:OPENAI_API_KEY}`.
    pub api_key: Option<String>,
    /// Model identifier sent with every request.
    pub model: Option<String>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Maximum tokens per completion.
    pub max_tokens: Option<u32>,
    /// Tool-use rounds allowed per user turn.
    pub max_tool_rounds: Option<usize>,
    /// Completion request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Persona seeded as the first message of every conversation.
    pub system_prompt: Option<String>,
    /// Settings for the `get_merge_diff` tool.
    #[serde(default)]
    pub gitlab: GitLabFile,
}

/// `[gitlab]` table of a configuration file.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GitLabFile {
    pub api_url: Option<String>,
    pub token: Option<String>,
}

/// Fully resolved configuration, constructed once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_tool_rounds: usize,
    pub timeout_secs: u64,
    pub system_prompt: String,
    pub gitlab: GitLabConfig,
}

/// Connection details for the GitLab API.
#[derive(Debug, Clone)]
pub struct GitLabConfig {
    pub api_url: String,
    pub token: Option<String>,
}

/// Values given on the command line. They win over every other layer.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_tool_rounds: Option<usize>,
}

impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            api_url: crate::constants::DEFAULT_GITLAB_API_URL.to_string(),
            token: None,
        }
    }
}
