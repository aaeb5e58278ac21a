//! Turns one model-issued [`ToolCall`] into exactly one tool-role [`Message`].

use serde_json::Value;
use thiserror::Error;

use crate::message::{Message, ToolCall};
use crate::tools::{ToolError, ToolRegistry};

/// Why a call produced an error result. Shown to the model, never raised.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("tool '{0}' not found")]
    NotFound(String),
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("error executing tool '{tool}': {source}")]
    Failed {
        tool: String,
        #[source]
        source: ToolError,
    },
}

/// Parse the raw argument text. Blank text means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}

/// Resolve, parse and invoke, surfacing each failure kind separately.
pub async fn try_dispatch(registry: &ToolRegistry, call: &ToolCall) -> Result<String, DispatchError> {
    let tool = registry
        .lookup(&call.name)
        .ok_or_else(|| DispatchError::NotFound(call.name.clone()))?;

    let input = parse_arguments(&call.arguments).map_err(|e| DispatchError::InvalidArguments {
        tool: call.name.clone(),
        reason: e.to_string(),
    })?;

    tool.execute(input).await.map_err(|e| match e {
        ToolError::InvalidArguments(reason) => DispatchError::InvalidArguments {
            tool: call.name.clone(),
            reason,
        },
        source => DispatchError::Failed {
            tool: call.name.clone(),
            source,
        },
    })
}

/// Run one tool call. Always returns a tool message answering `call.id`;
/// failures become the message content so the model can react to them.
pub async fn dispatch(registry: &ToolRegistry, call: &ToolCall) -> Message {
    let content = match try_dispatch(registry, call).await {
        Ok(output) => {
            tracing::debug!(tool = %call.name, id = %call.id, bytes = output.len(), "tool succeeded");
            output
        }
        Err(err) => {
            tracing::warn!(tool = %call.name, id = %call.id, error = %err, "tool call failed");
            err.to_string()
        }
    };
    Message::tool_result(call, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Role;
    use crate::tools::Tool;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Echoes its input back and counts invocations.
    struct EchoTool {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input"
        }
        fn schema(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(&self, input: Value) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if input.get("fail").is_some() {
                return Err(ToolError::Rejected("asked to fail".into()));
            }
            if input.get("bad").is_some() {
                return Err(ToolError::InvalidArguments("field `bad` not allowed".into()));
            }
            Ok(input.to_string())
        }
    }

    fn registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry
            .register(Box::new(EchoTool {
                calls: Arc::clone(&calls),
            }))
            .unwrap();
        (registry, calls)
    }

    #[tokio::test]
    async fn test_success_answers_call_id() {
        let (registry, calls) = registry();
        let call = ToolCall::new("call_9", "echo", r#"{"x":1}"#);
        let msg = dispatch(&registry, &call).await;
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_9"));
        assert_eq!(msg.tool_name.as_deref(), Some("echo"));
        assert_eq!(msg.text(), r#"{"x":1}"#);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_never_invokes_anything() {
        let (registry, calls) = registry();
        let call = ToolCall::new("call_1", "delete_everything", "{}");
        let msg = dispatch(&registry, &call).await;
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.text(), "tool 'delete_everything' not found");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_json_is_reported_without_invoking() {
        let (registry, calls) = registry();
        let call = ToolCall::new("call_2", "echo", "{not json");
        let err = try_dispatch(&registry, &call).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidArguments { .. }));
        let msg = dispatch(&registry, &call).await;
        assert!(msg.text().starts_with("invalid arguments for tool 'echo'"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_arguments_mean_empty_object() {
        let (registry, _) = registry();
        let msg = dispatch(&registry, &ToolCall::new("c", "echo", "  ")).await;
        assert_eq!(msg.text(), "{}");
    }

    #[tokio::test]
    async fn test_tool_errors_become_content() {
        let (registry, _) = registry();
        let msg = dispatch(&registry, &ToolCall::new("c", "echo", r#"{"fail":true}"#)).await;
        assert_eq!(msg.text(), "error executing tool 'echo': asked to fail");

        let msg = dispatch(&registry, &ToolCall::new("c", "echo", r#"{"bad":true}"#)).await;
        assert_eq!(
            msg.text(),
            "invalid arguments for tool 'echo': field `bad` not allowed"
        );
    }
}
