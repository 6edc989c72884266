//! Scripted LLM client for exercising agent loops without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::error::LlmError;
use askdb_llm_sdk::tools::ToolCall;
use askdb_llm_sdk::types::{CompletionRequest, CompletionResponse, Role, Usage};
use async_trait::async_trait;

/// Returns canned responses in order and records every request it receives.
/// When the script runs out it either fails or, with `looping`, replays the
/// last response forever.
pub struct ScriptedClient {
    script: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    looping: bool,
}

impl ScriptedClient {
    pub fn new(responses: Vec<CompletionResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            looping: false,
        }
    }

    /// Replays the final scripted response once the script is exhausted.
    pub fn looping(responses: Vec<CompletionResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
            looping: true,
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn text_response(content: &str) -> CompletionResponse {
        CompletionResponse {
            content: content.to_string(),
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("stop".to_string()),
            tool_calls: None,
        }
    }

    pub fn tool_call_response(tool_calls: Vec<ToolCall>) -> CompletionResponse {
        CompletionResponse {
            content: String::new(),
            role: Role::Assistant,
            usage: Usage::default(),
            stop_reason: Some("tool_calls".to_string()),
            tool_calls: Some(tool_calls),
        }
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request);

        let mut script = self.script.lock().unwrap();
        if self.looping && script.len() == 1 {
            return Ok(script.front().cloned().unwrap());
        }
        script
            .pop_front()
            .ok_or_else(|| LlmError::internal("Scripted client ran out of responses"))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
