//! HTTP client for OpenAI-compatible chat-completion endpoints.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::wire::{ChatRequest, ChatResponse, WireMessage, WireTool};
use super::{Choice, CompletionClient, CompletionResult, Usage};
use crate::config::Config;
use crate::constants::TOOL_CHOICE_AUTO;
use crate::error::CompletionError;
use crate::message::Message;
use crate::tools::ToolDefinition;

/// A configured endpoint ready to handle completion requests.
///
/// Model, sampling parameters and credential are fixed at construction.
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Creates a client from the resolved config.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or if the HTTP client
    /// cannot be built. Both happen before the conversation loop starts.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn decode(body: &str) -> Result<ChatResponse, CompletionError> {
        serde_json::from_str(body).map_err(|e| CompletionError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> Result<CompletionResult, CompletionError> {
        if messages.is_empty() {
            return Err(CompletionError::EmptyConversation);
        }

        let request = ChatRequest {
            model: &self.model,
            messages: messages.iter().map(WireMessage::from).collect(),
            tools: tools.iter().map(WireTool::from).collect(),
            tool_choice: (!tools.is_empty()).then_some(TOOL_CHOICE_AUTO),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            "sending completion request"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "completion endpoint returned an error");
            return Err(CompletionError::Endpoint {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = Self::decode(&body)?;
        if let Some(error) = parsed.error {
            return Err(CompletionError::Endpoint {
                status: status.as_u16(),
                body: error.to_string(),
            });
        }

        let usage = parsed.usage.map(|u| Usage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        tracing::debug!(
            model = parsed.model.as_deref().unwrap_or(&self.model),
            choices = parsed.choices.len(),
            total_tokens = usage.and_then(|u| u.total_tokens),
            "completion received"
        );

        Ok(CompletionResult {
            choices: parsed
                .choices
                .into_iter()
                .map(|c| Choice {
                    message: c.message.into_assistant(),
                    finish_reason: c.finish_reason,
                })
                .collect(),
            usage,
        })
    }
}
