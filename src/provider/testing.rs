//! Scripted [`CompletionClient`] for exercising the conversation loop offline.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{Choice, CompletionClient, CompletionResult};
use crate::error::CompletionError;
use crate::message::{Message, ToolCall};
use crate::tools::ToolDefinition;

/// What the scripted endpoint does on its next call.
pub enum Step {
    Respond(CompletionResult),
    Fail(CompletionError),
    /// Never completes; used to test cancellation.
    Hang,
}

impl Step {
    pub fn reply(text: &str) -> Self {
        Self::Respond(result_of(Message::assistant(text)))
    }

    /// An assistant turn requesting `(id, name, arguments)` calls, in order.
    pub fn tool_calls(calls: &[(&str, &str, &str)]) -> Self {
        Self::text_and_tool_calls("", calls)
    }

    /// Like [`Step::tool_calls`], with assistant text alongside the calls.
    pub fn text_and_tool_calls(text: &str, calls: &[(&str, &str, &str)]) -> Self {
        let calls = calls
            .iter()
            .map(|(id, name, args)| ToolCall::new(*id, *name, *args))
            .collect();
        Self::Respond(result_of(Message::assistant_with_tools(text, calls)))
    }

    pub fn no_choices() -> Self {
        Self::Respond(CompletionResult::default())
    }
}

fn result_of(message: Message) -> CompletionResult {
    let finish_reason = if message.tool_calls.is_empty() {
        "stop"
    } else {
        "tool_calls"
    };
    CompletionResult {
        choices: vec![Choice {
            message,
            finish_reason: Some(finish_reason.to_string()),
        }],
        usage: None,
    }
}

/// Replays a fixed script and records every conversation it was sent.
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedClient {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Snapshots of the conversation at each call, oldest first.
    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
    ) -> Result<CompletionResult, CompletionError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Respond(result)) => Ok(result),
            Some(Step::Fail(err)) => Err(err),
            Some(Step::Hang) => std::future::pending().await,
            None => Err(CompletionError::Decode("script exhausted".into())),
        }
    }
}
