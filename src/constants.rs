//! Centralized constants for relay.
//!
//! Default endpoint settings, tool limits and file names live here so they
//! can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "relay";

/// Default chat-completions base URL (the `/v1/chat/completions` path is appended).
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model identifier when neither config nor environment names one.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Sampling temperature sent with every completion request.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Maximum tokens for a single completion.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Tool-use rounds allowed within one user turn before the loop aborts.
pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 16;

/// Completion request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Tool-choice directive: let the model decide whether to call a tool.
pub const TOOL_CHOICE_AUTO: &str = "auto";

/// Default system prompt seeded into every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are relay, a helpful programming assistant in the terminal. \
You have tools to read files, list directories and fetch GitLab merge request diffs. \
Use them when they help answer the user's request. \
Respond only with tool calls when you need a tool, otherwise respond with text.";

/// Input that ends an interactive session, besides Ctrl+D.
pub const EXIT_COMMANDS: &[&str] = &["exit", "quit"];

// --- Environment variables ---

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_API_BASE";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_GITLAB_TOKEN: &str = "GITLAB_TOKEN";
pub const ENV_GITLAB_API_URL: &str = "GITLAB_API_URL";

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "RELAY_LOG";

/// Filter used when `RELAY_LOG` is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "relay=warn";

// --- Files ---

/// Global configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "relay.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "chat_history.txt";

// --- GitLab ---

/// Default GitLab instance.
pub const DEFAULT_GITLAB_API_URL: &str = "https://gitlab.com";

/// Page size requested from the merge request diffs endpoint.
pub const GITLAB_DIFFS_PER_PAGE: u32 = 100;

// --- Tool limits ---

/// Maximum file size (bytes) the read_file tool will read.
pub const READ_FILE_MAX_SIZE: u64 = 100 * 1024;

/// Byte threshold for binary file detection (check first N bytes for null).
pub const BINARY_DETECTION_BYTES: usize = 8192;

/// Maximum number of entries the list_files tool returns.
pub const LIST_FILES_MAX_ENTRIES: usize = 1000;

/// Width of the one-line tool result preview shown to the operator.
pub const TOOL_PREVIEW_WIDTH: usize = 120;
