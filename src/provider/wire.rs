//! Chat-completions wire format.
//!
//! Serde mirrors of the OpenAI-compatible request and response bodies, plus
//! conversions to and from relay's [`Message`] type. Nothing outside the
//! provider module sees these structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::message::{Message, Role, ToolCall};
use crate::tools::ToolDefinition;

#[derive(Debug, Serialize)]
pub(super) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'static str>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct WireTool<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction<'a>,
}

#[derive(Debug, Serialize)]
pub(super) struct WireFunction<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}

impl<'a> From<&'a ToolDefinition> for WireTool<'a> {
    fn from(def: &'a ToolDefinition) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: &def.name,
                description: &def.description,
                parameters: &def.parameters,
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireFunctionCall {
    pub name: String,
    /// A JSON-encoded string per the API. Some compatible servers send an object instead.
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<WireChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireChoice {
    pub message: WireMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireUsage {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        let tool_calls = (!msg.tool_calls.is_empty()).then(|| {
            msg.tool_calls
                .iter()
                .map(|c| WireToolCall {
                    id: c.id.clone(),
                    kind: function_kind(),
                    function: WireFunctionCall {
                        name: c.name.clone(),
                        arguments: Value::String(c.arguments.clone()),
                    },
                })
                .collect()
        });
        // An assistant turn that only calls tools carries no text.
        let content = if msg.requests_tools() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };
        Self {
            role: msg.role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
            name: msg.tool_name.clone(),
        }
    }
}

impl WireMessage {
    /// Converts a response message. Non-function tool calls are dropped.
    pub fn into_assistant(self) -> Message {
        let calls = self
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter(|c| c.kind == "function")
            .map(|c| {
                let arguments = match c.function.arguments {
                    Value::String(s) => s,
                    Value::Null => String::new(),
                    other => other.to_string(),
                };
                ToolCall::new(c.id, c.function.name, arguments)
            })
            .collect();
        Message::assistant_with_tools(self.content.unwrap_or_default(), calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_only_assistant_message_sends_null_content() {
        let msg = Message::assistant_with_tools("", vec![ToolCall::new("c1", "list_files", "{}")]);
        let wire = serde_json::to_value(WireMessage::from(&msg)).unwrap();
        assert_eq!(
            wire,
            json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "c1",
                    "type": "function",
                    "function": {"name": "list_files", "arguments": "{}"}
                }]
            })
        );
    }

    #[test]
    fn tool_result_carries_id_and_name() {
        let call = ToolCall::new("c1", "read_file", "{}");
        let wire = serde_json::to_value(WireMessage::from(&Message::tool_result(&call, "body"))).unwrap();
        assert_eq!(
            wire,
            json!({"role": "tool", "content": "body", "tool_call_id": "c1", "name": "read_file"})
        );
    }

    #[test]
    fn response_message_with_object_arguments_and_null_content() {
        let wire: WireMessage = serde_json::from_value(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [
                {"id": "a", "type": "function", "function": {"name": "read_file", "arguments": {"path": "x"}}},
                {"id": "b", "type": "retrieval", "function": {"name": "ignored", "arguments": ""}},
                {"id": "c", "function": {"name": "list_files"}}
            ]
        }))
        .unwrap();
        let msg = wire.into_assistant();
        assert_eq!(msg.content, "");
        assert_eq!(
            msg.tool_calls,
            vec![
                ToolCall::new("a", "read_file", r#"{"path":"x"}"#),
                ToolCall::new("c", "list_files", ""),
            ]
        );
    }

    #[test]
    fn request_omits_tools_when_catalog_empty() {
        let request = ChatRequest {
            model: "m",
            messages: vec![WireMessage::from(&Message::user("hi"))],
            tools: Vec::new(),
            tool_choice: None,
            temperature: 0.5,
            max_tokens: 10,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert_eq!(body["messages"][0], json!({"role": "user", "content": "hi"}));
    }
}
