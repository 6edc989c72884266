//! Append-only conversation history for an agent run.

use askdb_llm_sdk::tools::ToolCall;
use askdb_llm_sdk::types::{Message, Role};

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("Transcript is empty")]
    Empty,
}

/// The ordered message history of a single run. Messages are only ever
/// appended; nothing is edited or removed once recorded.
#[derive(Debug, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message. Panics if the message violates its role's shape,
    /// e.g. a tool result without a tool_call_id.
    pub fn append(&mut self, message: Message) {
        assert!(
            message.is_well_formed(),
            "Malformed {} message appended to transcript",
            message.role
        );
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Result<&Message, TranscriptError> {
        self.messages.last().ok_or(TranscriptError::Empty)
    }

    /// Tool calls from the latest assistant message that have no tool result
    /// recorded after it. The loop must answer these before asking the LLM
    /// to continue.
    pub fn unanswered_tool_calls(&self) -> Vec<&ToolCall> {
        let Some(position) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };

        let Some(tool_calls) = &self.messages[position].tool_calls else {
            return Vec::new();
        };

        let answered: Vec<&str> = self.messages[position + 1..]
            .iter()
            .filter(|m| m.role == Role::Tool)
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();

        tool_calls
            .iter()
            .filter(|call| !answered.contains(&call.id()))
            .collect()
    }
}
