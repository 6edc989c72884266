//! Fixed three-stage pipeline: generate a query, run it, answer from the rows.
//!
//! Unlike the agent loop, the pipeline makes exactly two LLM calls and one
//! query execution per question. There is no retry and no tool choice; the
//! structure is the control flow.

use std::sync::Arc;

use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::types::{CompletionRequest, Message, ResponseFormat};
use askdb_tools::types::QuerySqlRequest;
use askdb_tools::{ToolError, ToolExecutor};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::AgentError;

#[cfg(test)]
mod tests;

/// The output of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineResult {
    pub query: String,
    pub rows: Vec<Value>,
    pub answer: String,
}

pub struct DirectPipeline {
    client: Arc<dyn LlmClient>,
    tool_executor: Arc<ToolExecutor>,
    model: String,
    max_tokens: u32,
}

impl DirectPipeline {
    pub fn new(client: Arc<dyn LlmClient>, tool_executor: Arc<ToolExecutor>) -> Self {
        let model = client.model_name().to_string();
        Self {
            client,
            tool_executor,
            model,
            max_tokens: 2000,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Runs all three stages for one question.
    pub async fn run(&self, question: &str) -> Result<PipelineResult, AgentError> {
        let schema = askdb_tools::sql::describe_schema(self.tool_executor.db_path()).await?;

        let query = self.write_query(question, &schema).await?;
        info!(query = %query, "Generated query");

        let rows = self.execute_query(&query).await?;
        debug!(rows = rows.len(), "Query executed");

        let answer = self.generate_answer(question, &query, &rows).await?;

        Ok(PipelineResult {
            query,
            rows,
            answer,
        })
    }

    /// Stage one: ask the LLM for a single SQL query as structured JSON.
    async fn write_query(&self, question: &str, schema: &str) -> Result<String, AgentError> {
        let system = format!(
            "You translate questions into SQLite SELECT queries.
Respond with a JSON object of the form {{\"query\": \"<sql>\"}} and nothing else.
Write exactly one SELECT statement. Do not modify data.

Database schema:
{}",
            schema
        );

        let request = CompletionRequest {
            messages: vec![Message::user(question)],
            max_tokens: self.max_tokens,
            model: self.model.clone(),
            system: Some(system),
            temperature: Some(0.0),
            top_p: None,
            stop_sequences: None,
            tools: None,
            tool_choice: None,
            response_format: Some(ResponseFormat::JsonObject),
        };

        let response = self.client.complete(request).await?;
        parse_generated_query(&response.content)
    }

    /// Stage two: execute the query read-only and collect the rows.
    async fn execute_query(&self, query: &str) -> Result<Vec<Value>, AgentError> {
        let request = QuerySqlRequest {
            query: query.to_string(),
            limit: None,
        };

        let response = self
            .tool_executor
            .execute(askdb_tools::types::ToolRequest::QuerySql(request))
            .await
            .map_err(|e| match e {
                ToolError::Sql(message) => AgentError::Sql(message),
                other => AgentError::Tool(other),
            })?;

        let askdb_tools::types::ToolResponse::QuerySql(result) = response else {
            return Err(AgentError::Sql("Unexpected tool response".to_string()));
        };

        let rows: Vec<Value> = serde_json::from_str(&result.rows_json)
            .map_err(|e| AgentError::Sql(format!("Failed to parse result rows: {}", e)))?;
        Ok(rows)
    }

    /// Stage three: answer the question from the rows, plain text.
    async fn generate_answer(
        &self,
        question: &str,
        query: &str,
        rows: &[Value],
    ) -> Result<String, AgentError> {
        let prompt = answer_prompt(question, query, rows);

        let request = CompletionRequest {
            messages: vec![Message::user(prompt)],
            max_tokens: self.max_tokens,
            model: self.model.clone(),
            system: Some(
                "You answer questions about database query results. Be concise and factual. \
                 Base the answer only on the rows provided."
                    .to_string(),
            ),
            temperature: Some(0.0),
            top_p: None,
            stop_sequences: None,
            tools: None,
            tool_choice: None,
            response_format: None,
        };

        let response = self.client.complete(request).await?;
        Ok(response.content)
    }
}

fn answer_prompt(question: &str, query: &str, rows: &[Value]) -> String {
    let rows_json = serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string());
    format!(
        "Question: {}\n\nSQL query that was executed:\n{}\n\nRows returned:\n{}\n\nAnswer the question using only these rows.",
        question, query, rows_json
    )
}

/// Extracts the query from the structured-output response. Tolerates a model
/// that wraps the JSON in a markdown code fence despite instructions.
fn parse_generated_query(content: &str) -> Result<String, AgentError> {
    let stripped = strip_code_fence(content.trim());

    let value: Value = serde_json::from_str(stripped).map_err(|_| {
        AgentError::StructuredOutput(format!("Response is not valid JSON: {}", content))
    })?;

    let query = value
        .get("query")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AgentError::StructuredOutput(format!(
                "Response JSON has no string 'query' field: {}",
                content
            ))
        })?
        .trim();

    if query.is_empty() {
        return Err(AgentError::StructuredOutput(
            "Generated query is empty".to_string(),
        ));
    }

    Ok(query.to_string())
}

fn strip_code_fence(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("```") else {
        return content;
    };
    // Skip the optional language tag on the opening fence
    let rest = match rest.find('\n') {
        Some(position) => &rest[position + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
