//! Completion endpoint abstraction for relay.
//!
//! The conversation loop talks to the model through the [`CompletionClient`]
//! trait. [`OpenAiClient`] implements it over HTTP against any
//! OpenAI-compatible `/v1/chat/completions` endpoint.

mod client;
#[cfg(test)]
pub mod testing;
mod wire;

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::message::Message;
use crate::tools::ToolDefinition;

pub use client::OpenAiClient;

/// Token accounting reported by the endpoint, when it reports any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// One candidate reply. Only the first choice of a result is ever used.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    /// Always an assistant message: text, tool calls, or both.
    pub message: Message,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionResult {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl CompletionResult {
    /// Takes the first choice, discarding the rest.
    pub fn into_first(self) -> Option<Choice> {
        self.choices.into_iter().next()
    }
}

/// Sends a conversation plus the tool catalog to the model.
///
/// One call is one network request. `messages` must not be empty; `tools`
/// may be, in which case the model cannot request tool calls.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<CompletionResult, CompletionError>;
}
