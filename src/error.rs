//! Typed errors for the pieces of relay that callers branch on.
//!
//! Setup and CLI plumbing use `anyhow`; these enums cover the failures the
//! conversation loop has to tell apart.

use thiserror::Error;

/// Configuration problems detected before the loop starts. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key found. Set {var} or configure `api_key` in {file}")]
    MissingCredential { var: &'static str, file: &'static str },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failures talking to the chat-completions endpoint.
///
/// All variants are recoverable: the loop reports them and waits for new input.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("malformed completion response: {0}")]
    Decode(String),
    #[error("refusing to send an empty conversation")]
    EmptyConversation,
}

/// Failures building the tool registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is already registered")]
    Duplicate(String),
    #[error("failed to set up tool '{tool}': {reason}")]
    Setup { tool: &'static str, reason: String },
}
