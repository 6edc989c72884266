//! Tool-calling agent that answers natural-language questions over SQLite.
//!
//! The agent runs an explicit state machine over an append-only transcript:
//! ask the LLM, execute whatever tools it requested, feed the results back,
//! and repeat until the LLM replies with plain text or the cycle budget runs
//! out.

use std::sync::Arc;

use askdb_llm_sdk::client::LlmClient;
use askdb_llm_sdk::tools::{Tool, ToolCall, ToolChoice};
use askdb_llm_sdk::types::{CompletionRequest, Message};
use askdb_tools::ToolExecutor;
use tracing::{debug, info};

use crate::error::AgentError;
use crate::trace::{AgentResult, QueryCapture};
use crate::transcript::Transcript;
use crate::{format_tool_response, AgentTool};


/// Tunable knobs for a run. Defaults match interactive use.
#[derive(Debug, Clone)]
pub struct SqlAgentConfig {
    /// Model to use; falls back to the client's configured model
    pub model: Option<String>,
    /// LLM calls allowed before the run is abandoned
    pub max_cycles: usize,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Row count mentioned in the system prompt as a guideline
    pub row_limit_hint: usize,
}

impl Default for SqlAgentConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_cycles: 15,
            max_tokens: 4000,
            temperature: Some(0.7),
            row_limit_hint: 100,
        }
    }
}

/// Where the loop currently is. Each pass through the loop handles exactly
/// one state and moves to the next.
enum LoopState {
    AwaitingLlm,
    HandlingToolCalls(Vec<ToolCall>),
    Terminal(String),
}

pub struct SqlAgent {
    client: Arc<dyn LlmClient>,
    tool_executor: Arc<ToolExecutor>,
    system_prompt: String,
    config: SqlAgentConfig,
}

impl SqlAgent {
    pub async fn new(
        client: Arc<dyn LlmClient>,
        tool_executor: Arc<ToolExecutor>,
        config: SqlAgentConfig,
    ) -> Result<Self, AgentError> {
        let table_names = askdb_tools::sql::get_table_names(tool_executor.db_path()).await?;
        let db_name = db_name_from_path(tool_executor.db_path());
        let system_prompt = generate_system_prompt(&db_name, &table_names, config.row_limit_hint);

        Ok(Self {
            client,
            tool_executor,
            system_prompt,
            config,
        })
    }

    /// Builds an agent with a fixed table list, skipping database access
    #[cfg(test)]
    pub fn new_with_tables(
        client: Arc<dyn LlmClient>,
        tool_executor: Arc<ToolExecutor>,
        config: SqlAgentConfig,
        table_names: Vec<String>,
    ) -> Self {
        let db_name = db_name_from_path(tool_executor.db_path());
        let system_prompt = generate_system_prompt(&db_name, &table_names, config.row_limit_hint);

        Self {
            client,
            tool_executor,
            system_prompt,
            config,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    fn tool_definitions(&self) -> Vec<Tool> {
        AgentTool::all()
            .into_iter()
            .map(|tool| tool.to_tool_definition())
            .collect()
    }

    /// Runs the loop to completion for one question.
    pub async fn run(&self, question: &str) -> Result<AgentResult, AgentError> {
        let mut transcript = Transcript::new();
        transcript.append(Message::user(question));

        let mut capture = QueryCapture::new();
        let tools = self.tool_definitions();
        let model = self
            .config
            .model
            .clone()
            .unwrap_or_else(|| self.client.model_name().to_string());

        let mut cycles = 0;
        let mut state = LoopState::AwaitingLlm;

        loop {
            match state {
                LoopState::AwaitingLlm => {
                    cycles += 1;
                    if cycles > self.config.max_cycles {
                        let partial = capture.finish(String::new());
                        return Err(AgentError::DidNotConverge {
                            cycles: self.config.max_cycles,
                            partial: Box::new(partial),
                        });
                    }

                    debug!(cycle = cycles, "Requesting completion");

                    let request = CompletionRequest {
                        messages: transcript.messages().to_vec(),
                        max_tokens: self.config.max_tokens,
                        model: model.clone(),
                        system: Some(self.system_prompt.clone()),
                        temperature: self.config.temperature,
                        top_p: None,
                        stop_sequences: None,
                        tools: Some(tools.clone()),
                        tool_choice: Some(ToolChoice::Auto),
                        response_format: None,
                    };

                    let response = self.client.complete(request).await?;
                    let message = response.into_message();
                    capture.observe(&message);

                    state = if message.has_tool_calls() {
                        let calls = message.tool_calls.clone().unwrap_or_default();
                        transcript.append(message);
                        LoopState::HandlingToolCalls(calls)
                    } else {
                        let answer = message.content.clone();
                        transcript.append(message);
                        LoopState::Terminal(answer)
                    };
                }
                LoopState::HandlingToolCalls(calls) => {
                    for call in &calls {
                        let content = self.invoke_tool(call).await;
                        let message = Message::tool_result(call.id(), call.name(), content);
                        capture.observe(&message);
                        transcript.append(message);
                    }
                    state = LoopState::AwaitingLlm;
                }
                LoopState::Terminal(answer) => {
                    info!(cycles, queries = capture.completed().len(), "Agent run complete");
                    return Ok(capture.finish(answer));
                }
            }
        }
    }

    /// Executes one tool call. Failures become text content so the LLM can
    /// see the error and revise; they never abort the run.
    async fn invoke_tool(&self, call: &ToolCall) -> String {
        let request = match AgentTool::parse_tool_call(call.name(), call.arguments().clone()) {
            Ok(request) => request,
            Err(e) => {
                debug!(tool = call.name(), error = %e, "Tool call rejected");
                return format!("Tool {} failed: {}", call.name(), e);
            }
        };

        match self.tool_executor.execute(request).await {
            Ok(response) => {
                debug!(tool = call.name(), tool_id = call.id(), "Tool execution completed");
                format_tool_response(&response)
            }
            Err(e) => {
                debug!(tool = call.name(), tool_id = call.id(), error = %e, "Tool execution failed");
                format!("Tool {} failed: {}", call.name(), e)
            }
        }
    }
}

fn db_name_from_path(db_path: &str) -> String {
    std::path::Path::new(db_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("database")
        .to_string()
}

fn generate_system_prompt(db_name: &str, table_names: &[String], row_limit_hint: usize) -> String {
    let tables_list = if table_names.is_empty() {
        "No tables found".to_string()
    } else {
        table_names.join(", ")
    };

    format!(
        "You are a database analysis expert answering questions about a SQLite database.
Write SQL, run it with the query_sql tool, and answer the user's question from the rows it returns.

Available tools:
- query_sql: execute a read-only SQL query and get the rows back as JSON
- query_checker: review a query for problems before running it
- describe_schema: get the CREATE TABLE statements and columns for every table

Only SELECT queries and PRAGMA statements are allowed. Do NOT attempt CREATE, \
INSERT, UPDATE, DELETE, ALTER, DROP, or any other modification; they will be rejected.

Keep result sets small. Queries without a LIMIT are capped at {} rows.

When you have enough data, reply with a plain-text answer to the question. \
Base the answer only on rows you actually retrieved.

You are analyzing the database named: {}
Tables in the database: {}
",
        row_limit_hint, db_name, tables_list
    )
}
