use crate::tools::{Tool, ToolCall, ToolChoice};
use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant message
    Assistant,
    /// System message
    System,
    /// Tool result message
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A message in a conversation.
///
/// Only assistant messages may carry `tool_calls`, and only tool messages
/// carry `tool_call_id`/`tool_name`. The constructors below are the only
/// intended way to build messages; [`Message::is_well_formed`] checks the
/// invariant for callers that append into a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender
    pub role: Role,
    /// Text content of the message
    pub content: String,
    /// Tool calls requested by the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// Correlation id of the tool call this message answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Name of the tool that produced this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: None,
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Create an assistant message with plain text content
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::text(Role::Assistant, content)
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// Create an assistant message carrying tool-call requests
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
            tool_name: None,
        }
    }

    /// Create a tool result message answering the given tool call
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.into()),
            tool_name: Some(tool_name.into()),
        }
    }

    /// Whether this message carries at least one tool-call request
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty())
    }

    /// Role/field invariant: tool calls only on assistant messages, tool
    /// metadata only on tool messages.
    pub fn is_well_formed(&self) -> bool {
        match self.role {
            Role::Assistant => self.tool_call_id.is_none() && self.tool_name.is_none(),
            Role::Tool => {
                self.tool_calls.is_none()
                    && self.tool_call_id.is_some()
                    && self.tool_name.is_some()
            }
            Role::User | Role::System => {
                self.tool_calls.is_none() && self.tool_call_id.is_none() && self.tool_name.is_none()
            }
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the input prompt
    pub input_tokens: u32,
    /// Number of tokens in the output completion
    pub output_tokens: u32,
}

/// Response format type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Plain text response
    Text,
    /// JSON object response (structured output)
    JsonObject,
}

/// Generic completion request (provider-agnostic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Messages for the conversation
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Model to use (provider-specific)
    pub model: String,
    /// Optional system message
    pub system: Option<String>,
    /// Temperature for randomness (0.0 to 1.0)
    pub temperature: Option<f32>,
    /// Top-p sampling parameter
    pub top_p: Option<f32>,
    /// Stop sequences
    pub stop_sequences: Option<Vec<String>>,
    /// Tools available to the LLM
    pub tools: Option<Vec<Tool>>,
    /// Tool choice strategy
    pub tool_choice: Option<ToolChoice>,
    /// Response format (text or JSON object)
    pub response_format: Option<ResponseFormat>,
}

/// Generic completion response (provider-agnostic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text content
    pub content: String,
    /// Role of the response
    pub role: Role,
    /// Token usage information
    pub usage: Usage,
    /// Stop reason
    pub stop_reason: Option<String>,
    /// Tool calls requested by the LLM
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl CompletionResponse {
    /// Convert this response into the conversation message it represents,
    /// preserving tool calls in arrival order.
    pub fn into_message(self) -> Message {
        match self.tool_calls {
            Some(calls) if !calls.is_empty() => Message::assistant_with_tools(self.content, calls),
            _ => Message::assistant(self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constructors_are_well_formed() {
        assert!(Message::user("hi").is_well_formed());
        assert!(Message::assistant("hello").is_well_formed());
        assert!(Message::system("rules").is_well_formed());
        assert!(Message::tool_result("call_1", "query_sql", "[]").is_well_formed());

        let call = ToolCall::new("call_1".into(), "query_sql".into(), json!({"query": "SELECT 1"}));
        assert!(Message::assistant_with_tools("", vec![call]).is_well_formed());
    }

    #[test]
    fn malformed_message_detected() {
        let mut msg = Message::user("hi");
        msg.tool_calls = Some(vec![]);
        assert!(!msg.is_well_formed());

        let mut msg = Message::tool_result("call_1", "query_sql", "[]");
        msg.tool_name = None;
        assert!(!msg.is_well_formed());
    }

    #[test]
    fn response_into_message_preserves_tool_calls() {
        let calls = vec![
            ToolCall::new("a".into(), "query_sql".into(), json!({"query": "SELECT 1"})),
            ToolCall::new("b".into(), "query_sql".into(), json!({"query": "SELECT 2"})),
        ];
        let response = CompletionResponse {
            content: String::new(),
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("tool_calls".into()),
            tool_calls: Some(calls),
        };
        let msg = response.into_message();
        let calls = msg.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id(), "a");
        assert_eq!(calls[1].id(), "b");
    }

    #[test]
    fn response_without_tool_calls_is_plain_assistant() {
        let response = CompletionResponse {
            content: "done".into(),
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("stop".into()),
            tool_calls: Some(vec![]),
        };
        let msg = response.into_message();
        assert!(!msg.has_tool_calls());
        assert_eq!(msg.content, "done");
    }
}
