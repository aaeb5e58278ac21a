//! The append-only transcript of a session.
//!
//! [`Conversation`] is the only state a session keeps. It starts with a single
//! system message and grows by appending; nothing is persisted when the
//! process exits.

use crate::message::{Message, Role};

/// Position in the transcript, taken before a step that may be cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark(usize);

/// Ordered sequence of messages exchanged in one session.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Starts a conversation seeded with the given system prompt.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.messages.extend(messages);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn mark(&self) -> Mark {
        Mark(self.messages.len())
    }

    /// Drops everything appended after `mark`.
    ///
    /// Only used to discard a half-appended turn on cancellation, so the
    /// transcript never ends with tool calls that have no results.
    pub fn discard_from(&mut self, mark: Mark) {
        self.messages.truncate(mark.0.max(1));
    }

    /// Iterates over the messages a user would want to see (everything but system).
    pub fn visible(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(|m| m.role != Role::System)
    }

    /// Checks that every tool result answers a call of the nearest preceding
    /// assistant message, in issuance order, with none missing.
    #[cfg(test)]
    pub fn is_well_formed(&self) -> bool {
        let mut pending: std::collections::VecDeque<&str> = Default::default();
        for msg in &self.messages {
            match msg.role {
                Role::Tool => match (pending.pop_front(), msg.tool_call_id.as_deref()) {
                    (Some(expected), Some(got)) if expected == got => {}
                    _ => return false,
                },
                _ if !pending.is_empty() => return false,
                Role::Assistant => {
                    pending = msg.tool_calls.iter().map(|c| c.id.as_str()).collect();
                }
                _ => {}
            }
        }
        pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCall;

    fn roles(conv: &Conversation) -> Vec<Role> {
        conv.messages().iter().map(|m| m.role).collect()
    }

    #[test]
    fn seeded_with_system_prompt() {
        let conv = Conversation::new("be helpful");
        assert_eq!(conv.len(), 1);
        assert!(!conv.is_empty());
        assert_eq!(conv.messages()[0].role, Role::System);
        assert_eq!(conv.visible().count(), 0);
    }

    #[test]
    fn tool_cycle_preserves_order() {
        let mut conv = Conversation::new("sys");
        conv.push(Message::user("list files"));
        let calls = vec![
            ToolCall::new("a", "list_files", ""),
            ToolCall::new("b", "read_file", r#"{"path":"x"}"#),
        ];
        conv.push(Message::assistant_with_tools("", calls.clone()));
        conv.extend(calls.iter().map(|c| Message::tool_result(c, "ok")));
        conv.push(Message::assistant("done"));

        assert_eq!(
            roles(&conv),
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::Tool,
                Role::Tool,
                Role::Assistant
            ]
        );
        assert!(conv.is_well_formed());
    }

    #[test]
    fn missing_or_reordered_results_are_not_well_formed() {
        let calls = vec![ToolCall::new("a", "t", ""), ToolCall::new("b", "t", "")];

        let mut missing = Conversation::new("sys");
        missing.push(Message::assistant_with_tools("", calls.clone()));
        missing.push(Message::tool_result(&calls[0], "ok"));
        assert!(!missing.is_well_formed());

        let mut reordered = Conversation::new("sys");
        reordered.push(Message::assistant_with_tools("", calls.clone()));
        reordered.push(Message::tool_result(&calls[1], "ok"));
        reordered.push(Message::tool_result(&calls[0], "ok"));
        assert!(!reordered.is_well_formed());
    }

    #[test]
    fn discard_keeps_everything_before_mark() {
        let mut conv = Conversation::new("sys");
        conv.push(Message::user("hi"));
        let mark = conv.mark();
        conv.push(Message::assistant_with_tools(
            "",
            vec![ToolCall::new("a", "t", "")],
        ));
        conv.discard_from(mark);
        assert_eq!(roles(&conv), vec![Role::System, Role::User]);
        assert!(conv.is_well_formed());
    }

    #[test]
    fn discard_never_drops_system_prompt() {
        let mut conv = Conversation::new("sys");
        conv.discard_from(Mark(0));
        assert_eq!(conv.len(), 1);
    }
}
