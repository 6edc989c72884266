use crate::trace::AgentResult;
use crate::transcript::TranscriptError;

/// Errors produced while driving an agent or pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Agent did not produce a final answer within {cycles} cycles")]
    DidNotConverge {
        cycles: usize,
        partial: Box<AgentResult>,
    },

    #[error("Structured output error: {0}")]
    StructuredOutput(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("LLM error: {0}")]
    Llm(#[from] askdb_llm_sdk::LlmError),

    #[error("Tool error: {0}")]
    Tool(#[from] askdb_tools::ToolError),

    #[error("Transcript is empty")]
    EmptyTranscript,
}

impl From<TranscriptError> for AgentError {
    fn from(err: TranscriptError) -> Self {
        match err {
            TranscriptError::Empty => AgentError::EmptyTranscript,
        }
    }
}
