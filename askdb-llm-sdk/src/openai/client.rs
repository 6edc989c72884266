use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::{
    error::LlmError,
    openai::types::{
        ChatCompletionRequest, ChatCompletionResponse, ChatErrorResponse, ChatFunction,
        ChatFunctionCall, ChatMessage, ChatResponseFormat, ChatRole, ChatTool, ChatToolCall,
    },
    tools::{ToolCall, ToolChoice},
    types::{CompletionRequest, CompletionResponse, Message, ResponseFormat, Role, Usage},
};
use async_trait::async_trait;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible Chat Completions client.
///
/// Works against any endpoint that speaks the `/chat/completions` protocol;
/// use [`OpenAiClient::with_base_url`] to point it elsewhere.
pub struct OpenAiClient {
    api_key: String,
    base_url: String,
    model: String,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new client with the given API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LlmError::authentication("API key cannot be empty"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Network { source: e })?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            http_client,
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the default model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Create a chat completion against the raw wire types
    pub async fn create_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|_| LlmError::authentication("Invalid API key format"))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .http_client
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Network { source: e })?;

        let status = response.status();

        if status.is_success() {
            let chat_response: ChatCompletionResponse = response
                .json()
                .await
                .map_err(|e| LlmError::internal(format!("Failed to parse response: {}", e)))?;
            Ok(chat_response)
        } else {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse().ok());

            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ChatErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);

            match status {
                reqwest::StatusCode::BAD_REQUEST => Err(LlmError::invalid_request(message)),
                reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                    Err(LlmError::authentication(message))
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    Err(LlmError::rate_limit(message, retry_after))
                }
                _ => Err(LlmError::api_error(status.as_u16(), message)),
            }
        }
    }

    fn to_chat_messages(system: Option<String>, messages: Vec<Message>) -> Vec<ChatMessage> {
        let mut chat_messages = Vec::with_capacity(messages.len() + 1);

        if let Some(system) = system {
            chat_messages.push(ChatMessage::system(system));
        }

        for msg in messages {
            let chat_message = match msg.role {
                Role::System => ChatMessage::system(msg.content),
                Role::User => ChatMessage::user(msg.content),
                Role::Assistant => match msg.tool_calls {
                    Some(calls) if !calls.is_empty() => ChatMessage::assistant_with_tools(
                        msg.content,
                        calls.into_iter().map(to_chat_tool_call).collect(),
                    ),
                    _ => ChatMessage::assistant(msg.content),
                },
                Role::Tool => ChatMessage::tool_result(
                    msg.tool_call_id.unwrap_or_default(),
                    msg.content,
                ),
            };
            chat_messages.push(chat_message);
        }

        chat_messages
    }
}

fn to_chat_tool_call(call: ToolCall) -> ChatToolCall {
    ChatToolCall {
        id: call.id().to_string(),
        r#type: "function".to_string(),
        function: ChatFunctionCall {
            name: call.name().to_string(),
            arguments: call.arguments().to_string(),
        },
    }
}

fn from_chat_tool_call(call: ChatToolCall) -> ToolCall {
    // Arguments arrive as a JSON string; a malformed payload is kept verbatim
    // so the caller can surface it back to the model instead of failing here
    let arguments = serde_json::from_str(&call.function.arguments)
        .unwrap_or(serde_json::Value::String(call.function.arguments.clone()));
    ToolCall::new(call.id, call.function.name, arguments)
}

fn to_chat_tool_choice(choice: &ToolChoice) -> serde_json::Value {
    match choice {
        ToolChoice::Auto => serde_json::json!("auto"),
        ToolChoice::Required => serde_json::json!("required"),
        ToolChoice::None => serde_json::json!("none"),
        ToolChoice::Specific { name } => {
            serde_json::json!({"type": "function", "function": {"name": name}})
        }
    }
}

#[async_trait]
impl crate::client::LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let tools = request.tools.map(|tools| {
            tools
                .into_iter()
                .map(|tool| ChatTool {
                    r#type: "function".to_string(),
                    function: ChatFunction {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        parameters: tool.parameters().clone(),
                    },
                })
                .collect()
        });

        let chat_request = ChatCompletionRequest {
            model: request.model,
            messages: Self::to_chat_messages(request.system, request.messages),
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
            top_p: request.top_p,
            stop: request.stop_sequences,
            tools,
            tool_choice: request.tool_choice.as_ref().map(to_chat_tool_choice),
            response_format: request.response_format.map(|rf| match rf {
                ResponseFormat::Text => ChatResponseFormat::text(),
                ResponseFormat::JsonObject => ChatResponseFormat::json_object(),
            }),
        };

        let chat_response = self.create_chat_completion(chat_request).await?;

        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::internal("Response contained no choices"))?;

        let tool_calls = choice.message.tool_calls.map(|calls| {
            calls
                .into_iter()
                .map(from_chat_tool_call)
                .collect::<Vec<_>>()
        });

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            role: match choice.message.role {
                ChatRole::Assistant => Role::Assistant,
                ChatRole::User => Role::User,
                ChatRole::System => Role::System,
                ChatRole::Tool => Role::Tool,
            },
            usage: Usage {
                input_tokens: chat_response.usage.prompt_tokens,
                output_tokens: chat_response.usage.completion_tokens,
            },
            stop_reason: choice.finish_reason,
            tool_calls: tool_calls.filter(|calls| !calls.is_empty()),
        })
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
