//! The conversation loop.
//!
//! [`Agent::run_turn`] takes one line of user input through as many
//! completion/tool rounds as the model asks for, until the model answers in
//! plain text. Every tool call the model issues gets exactly one tool result
//! appended, in issuance order, before the next completion request is sent.
//!
//! ```text
//! AwaitingUserInput --input--> AwaitingCompletion --tool calls--> ProcessingToolCalls
//!        ^                            |   ^                               |
//!        |<---- text reply / error ---+   +------- results appended ------+
//!        |
//!   exit / eof ---> Terminated
//! ```

mod dispatch;

pub use dispatch::dispatch;

use tokio_util::sync::CancellationToken;

use crate::constants::EXIT_COMMANDS;
use crate::conversation::{Conversation, Mark};
use crate::error::CompletionError;
use crate::message::{Message, ToolCall};
use crate::output::Renderer;
use crate::provider::CompletionClient;
use crate::tools::ToolRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingUserInput,
    AwaitingCompletion,
    ProcessingToolCalls,
    Terminated,
}

/// How a single user turn ended.
///
/// Only [`TurnOutcome::Reply`] is a success; every other variant is
/// recoverable and leaves the agent ready for the next input.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The model answered without requesting tools.
    Reply(String),
    /// The completion request failed. The user message stays in the transcript.
    TransportFailed(CompletionError),
    /// The endpoint answered with something the loop cannot act on.
    ProtocolViolation(String),
    /// The model kept requesting tools past the configured cap.
    RoundLimitExceeded(usize),
    /// The operator interrupted the turn.
    Cancelled,
}

impl TurnOutcome {
    /// Operator-facing description of a failed turn, `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Reply(_) => None,
            Self::TransportFailed(err) => Some(format!("completion request failed: {err}")),
            Self::ProtocolViolation(reason) => Some(format!("unusable response: {reason}")),
            Self::RoundLimitExceeded(cap) => Some(format!("aborting: too many tool rounds ({cap})")),
            Self::Cancelled => Some("interrupted".to_string()),
        }
    }
}

/// One line read at the prompt, classified.
#[derive(Debug, PartialEq, Eq)]
pub enum Input<'a> {
    /// Blank line; ignored.
    Empty,
    /// Exit token or end of input.
    Exit,
    /// Starts with `/`; handled locally, never sent to the model.
    Command(&'a str),
    Prompt(&'a str),
}

impl<'a> Input<'a> {
    /// `None` means end of input.
    pub fn classify(line: Option<&'a str>) -> Self {
        let Some(line) = line.map(str::trim) else {
            return Self::Exit;
        };
        if line.is_empty() {
            Self::Empty
        } else if EXIT_COMMANDS.contains(&line) {
            Self::Exit
        } else if line.starts_with('/') {
            Self::Command(line)
        } else {
            Self::Prompt(line)
        }
    }
}

/// Message appended for calls left unanswered when the round cap is hit.
const ROUND_LIMIT_RESULT: &str = "not executed: tool round limit reached";

/// Drives a [`Conversation`] against a completion endpoint and a tool set.
pub struct Agent<'a> {
    client: &'a dyn CompletionClient,
    tools: &'a ToolRegistry,
    conversation: Conversation,
    max_tool_rounds: usize,
    state: LoopState,
}

impl<'a> Agent<'a> {
    pub fn new(
        client: &'a dyn CompletionClient,
        tools: &'a ToolRegistry,
        conversation: Conversation,
        max_tool_rounds: usize,
    ) -> Self {
        Self {
            client,
            tools,
            conversation,
            max_tool_rounds: max_tool_rounds.max(1),
            state: LoopState::AwaitingUserInput,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[cfg(test)]
    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.tools
    }

    /// Ends the session. Later calls to [`Agent::run_turn`] are refused.
    pub fn terminate(&mut self) {
        self.transition(LoopState::Terminated);
    }

    fn transition(&mut self, next: LoopState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "loop state");
            self.state = next;
        }
    }

    /// Ends the turn and returns to the prompt.
    fn finish(&mut self, outcome: TurnOutcome) -> TurnOutcome {
        self.transition(LoopState::AwaitingUserInput);
        outcome
    }

    fn cancel(&mut self, mark: Mark) -> TurnOutcome {
        tracing::info!(kept = ?mark, "turn cancelled, discarding unfinished round");
        self.conversation.discard_from(mark);
        self.finish(TurnOutcome::Cancelled)
    }

    /// Runs one user turn to completion.
    ///
    /// Assistant text and tool activity are shown through `renderer` as they
    /// happen; failures are only returned, never rendered here. Cancelling
    /// `cancel` drops whatever the current round had appended, so the
    /// conversation stays in its last fully-appended state.
    pub async fn run_turn(
        &mut self,
        input: &str,
        renderer: &mut dyn Renderer,
        cancel: &CancellationToken,
    ) -> TurnOutcome {
        if self.state == LoopState::Terminated {
            return TurnOutcome::ProtocolViolation("session already terminated".into());
        }

        self.conversation.push(Message::user(input));
        let definitions = self.tools.definitions();
        let mut rounds = 0;

        loop {
            self.transition(LoopState::AwaitingCompletion);
            let mark = self.conversation.mark();

            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                r = self.client.complete(self.conversation.messages(), &definitions) => Some(r),
            };
            let result = match response {
                None => return self.cancel(mark),
                Some(Ok(result)) => result,
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "completion failed");
                    return self.finish(TurnOutcome::TransportFailed(err));
                }
            };

            if let Some(usage) = result.usage {
                tracing::debug!(
                    prompt_tokens = ?usage.prompt_tokens,
                    completion_tokens = ?usage.completion_tokens,
                    total_tokens = ?usage.total_tokens,
                    "token usage"
                );
            }
            let Some(choice) = result.into_first() else {
                tracing::warn!("completion response had no choices");
                return self.finish(TurnOutcome::ProtocolViolation(
                    "completion response contained no choices".into(),
                ));
            };
            tracing::debug!(
                finish_reason = choice.finish_reason.as_deref().unwrap_or("none"),
                tool_calls = choice.message.tool_calls.len(),
                "assistant message received"
            );
            let assistant = choice.message;
            if !assistant.text().is_empty() {
                renderer.assistant_text(assistant.text());
            }

            if !assistant.requests_tools() {
                let reply = assistant.content.clone();
                self.conversation.push(assistant);
                return self.finish(TurnOutcome::Reply(reply));
            }

            let calls: Vec<ToolCall> = assistant.tool_calls.clone();
            self.conversation.push(assistant);
            self.transition(LoopState::ProcessingToolCalls);

            rounds += 1;
            if rounds > self.max_tool_rounds {
                tracing::warn!(cap = self.max_tool_rounds, "tool round limit reached");
                self.conversation.extend(
                    calls
                        .iter()
                        .map(|call| Message::tool_result(call, ROUND_LIMIT_RESULT)),
                );
                return self.finish(TurnOutcome::RoundLimitExceeded(self.max_tool_rounds));
            }

            tracing::debug!(round = rounds, calls = calls.len(), "processing tool calls");
            for call in &calls {
                renderer.tool_start(&call.name, &call.arguments);
                let message = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    m = dispatch(self.tools, call) => Some(m),
                };
                let Some(message) = message else {
                    return self.cancel(mark);
                };
                renderer.tool_result(&call.name, message.text());
                self.conversation.push(message);
            }
        }
    }
}
