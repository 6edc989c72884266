use std::sync::Arc;

use askdb_tools::ToolExecutor;
use rusqlite::Connection;
use serde_json::json;
use tempfile::NamedTempFile;

use super::*;
use crate::test_support::ScriptedClient;

fn album_db() -> (NamedTempFile, String) {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE Album (AlbumId INTEGER PRIMARY KEY, Title TEXT);
         INSERT INTO Album (Title) VALUES ('Blue Train'), ('Giant Steps');",
    )
    .unwrap();
    drop(conn);
    (temp_file, path)
}

fn pipeline_with(client: Arc<ScriptedClient>, db_path: &str) -> DirectPipeline {
    DirectPipeline::new(client, Arc::new(ToolExecutor::new(db_path)))
}

#[tokio::test]
async fn runs_all_three_stages() {
    let (_guard, path) = album_db();

    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text_response(r#"{"query": "SELECT COUNT(*) AS AlbumCount FROM Album"}"#),
        ScriptedClient::text_response("There are 2 albums."),
    ]));

    let pipeline = pipeline_with(client.clone(), &path);
    let result = pipeline.run("How many albums are there?").await.unwrap();

    assert_eq!(result.query, "SELECT COUNT(*) AS AlbumCount FROM Album");
    assert_eq!(result.rows, vec![json!({"AlbumCount": 2})]);
    assert_eq!(result.answer, "There are 2 albums.");

    let requests = client.requests();
    assert_eq!(requests.len(), 2);
    // First stage asks for structured output; second does not
    assert_eq!(
        requests[0].response_format,
        Some(askdb_llm_sdk::types::ResponseFormat::JsonObject)
    );
    assert!(requests[0]
        .system
        .as_deref()
        .unwrap()
        .contains("CREATE TABLE Album"));
    assert!(requests[1].response_format.is_none());
    assert!(requests[1].messages[0].content.contains("AlbumCount"));
}

#[tokio::test]
async fn fenced_json_is_tolerated() {
    let (_guard, path) = album_db();

    let client = Arc::new(ScriptedClient::new(vec![
        ScriptedClient::text_response(
            "```json\n{\"query\": \"SELECT Title FROM Album ORDER BY AlbumId\"}\n```",
        ),
        ScriptedClient::text_response("Blue Train and Giant Steps."),
    ]));

    let pipeline = pipeline_with(client, &path);
    let result = pipeline.run("List the albums").await.unwrap();

    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0]["Title"], json!("Blue Train"));
}

#[tokio::test]
async fn non_json_response_is_structured_output_error() {
    let (_guard, path) = album_db();

    let client = Arc::new(ScriptedClient::new(vec![ScriptedClient::text_response(
        "SELECT COUNT(*) FROM Album",
    )]));

    let pipeline = pipeline_with(client, &path);
    let err = pipeline.run("How many albums?").await.unwrap_err();
    assert!(matches!(err, AgentError::StructuredOutput(_)));
}

#[tokio::test]
async fn missing_query_field_is_structured_output_error() {
    let (_guard, path) = album_db();

    let client = Arc::new(ScriptedClient::new(vec![ScriptedClient::text_response(
        r#"{"sql": "SELECT 1"}"#,
    )]));

    let pipeline = pipeline_with(client, &path);
    let err = pipeline.run("How many albums?").await.unwrap_err();
    assert!(matches!(err, AgentError::StructuredOutput(_)));
}

#[tokio::test]
async fn rejected_query_is_sql_error() {
    let (_guard, path) = album_db();

    let client = Arc::new(ScriptedClient::new(vec![ScriptedClient::text_response(
        r#"{"query": "DROP TABLE Album"}"#,
    )]));

    let pipeline = pipeline_with(client.clone(), &path);
    let err = pipeline.run("Remove the albums").await.unwrap_err();

    assert!(matches!(err, AgentError::Sql(_)));
    // The answer stage never runs
    assert_eq!(client.requests().len(), 1);
}

#[test]
fn parse_generated_query_trims_and_validates() {
    assert_eq!(
        parse_generated_query(r#"{"query": "  SELECT 1  "}"#).unwrap(),
        "SELECT 1"
    );
    assert!(parse_generated_query(r#"{"query": ""}"#).is_err());
    assert!(parse_generated_query(r#"{"query": 42}"#).is_err());
}
