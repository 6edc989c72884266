use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::error::LlmError;
use askdb_llm_sdk::openai::OpenAiClient;
use askdb_llm_sdk::tools::{Tool, ToolChoice};
use askdb_llm_sdk::types::{CompletionRequest, Message};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
struct QueryArgs {
    query: String,
}

fn request(client: &OpenAiClient, messages: Vec<Message>) -> CompletionRequest {
    CompletionRequest {
        messages,
        max_tokens: 256,
        model: client.model_name().to_string(),
        system: Some("You answer questions about a SQLite database.".to_string()),
        temperature: Some(0.0),
        top_p: None,
        stop_sequences: None,
        tools: None,
        tool_choice: None,
        response_format: None,
    }
}

#[tokio::test]
async fn complete_returns_text_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "There are 8 employees."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 20, "completion_tokens": 6, "total_tokens": 26}
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let req = request(&client, vec![Message::user("How many employees?")]);
    let response = client.complete(req).await.unwrap();

    assert_eq!(response.content, "There are 8 employees.");
    assert!(response.tool_calls.is_none());
    assert_eq!(response.usage.input_tokens, 20);
    mock.assert_async().await;
}

#[tokio::test]
async fn complete_extracts_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1700000000,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc",
                            "type": "function",
                            "function": {
                                "name": "query_sql",
                                "arguments": "{\"query\": \"SELECT COUNT(*) FROM Employee\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": {"prompt_tokens": 30, "completion_tokens": 12, "total_tokens": 42}
            }"#,
        )
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let mut req = request(&client, vec![Message::user("How many employees?")]);
    req.tools = Some(vec![Tool::from_type::<QueryArgs>()
        .name("query_sql")
        .description("Execute a SQL query")
        .build()]);
    req.tool_choice = Some(ToolChoice::Auto);

    let response = client.complete(req).await.unwrap();
    let calls = response.tool_calls.expect("expected tool calls");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].id(), "call_abc");
    assert_eq!(calls[0].name(), "query_sql");
    let args: QueryArgs = calls[0].parse_arguments().unwrap();
    assert_eq!(args.query, "SELECT COUNT(*) FROM Employee");
}

#[tokio::test]
async fn unauthorized_maps_to_authentication_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#)
        .create_async()
        .await;

    let client = OpenAiClient::new("bad-key")
        .unwrap()
        .with_base_url(server.url());

    let req = request(&client, vec![Message::user("hello")]);
    let err = client.complete(req).await.unwrap_err();
    assert!(matches!(err, LlmError::Authentication { .. }));
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("retry-after", "7")
        .with_body(r#"{"error": {"message": "Rate limit reached", "type": "rate_limit_error"}}"#)
        .create_async()
        .await;

    let client = OpenAiClient::new("test-key")
        .unwrap()
        .with_base_url(server.url());

    let req = request(&client, vec![Message::user("hello")]);
    match client.complete(req).await.unwrap_err() {
        LlmError::RateLimit { retry_after, .. } => assert_eq!(retry_after, Some(7)),
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[test]
fn trait_object_usage() {
    let _client: Box<dyn LlmClient> = Box::new(OpenAiClient::new("test-key").unwrap());
}
