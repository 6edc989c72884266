//! Captures the queries an agent ran and the rows they returned.

use std::collections::HashMap;

use askdb_llm_sdk::types::{Message, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single executed query and the rows it produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    pub query: String,
    pub rows: Vec<Value>,
}

/// The outcome of an agent run: every query it executed, in order, plus its
/// final answer text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentResult {
    pub queries: Vec<QueryResult>,
    pub final_answer: String,
}

/// Watches the message stream and pairs each query_sql tool call with the
/// tool result that answers it, correlated by tool-call id. Calls may be
/// answered out of order or interleaved with other tools.
#[derive(Debug, Default)]
pub struct QueryCapture {
    pending: HashMap<String, String>,
    completed: Vec<QueryResult>,
}

impl QueryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one message through the capture. Assistant messages register
    /// pending query_sql calls; tool messages resolve them.
    pub fn observe(&mut self, message: &Message) {
        match message.role {
            Role::Assistant => {
                let Some(tool_calls) = &message.tool_calls else {
                    return;
                };
                for call in tool_calls {
                    if call.name() != "query_sql" {
                        continue;
                    }
                    let query = call
                        .arguments()
                        .get("query")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string();
                    self.pending.insert(call.id().to_string(), query);
                }
            }
            Role::Tool => {
                let Some(call_id) = &message.tool_call_id else {
                    return;
                };
                if message.tool_name.as_deref() != Some("query_sql") {
                    // Other tools do not produce rows but still clear any
                    // stale pending entry under the same id.
                    self.pending.remove(call_id);
                    return;
                }
                match self.pending.remove(call_id) {
                    Some(query) => {
                        self.completed.push(QueryResult {
                            query,
                            rows: parse_rows(&message.content),
                        });
                    }
                    None => {
                        warn!(
                            tool_call_id = %call_id,
                            "Dropping query_sql result with no matching pending call"
                        );
                    }
                }
            }
            _ => {}
        }
    }

    pub fn completed(&self) -> &[QueryResult] {
        &self.completed
    }

    /// Consumes the capture, pairing it with the agent's final answer.
    /// Pending calls that never received a result are logged and discarded.
    pub fn finish(self, final_answer: String) -> AgentResult {
        for (call_id, query) in &self.pending {
            warn!(
                tool_call_id = %call_id,
                query = %query,
                "query_sql call never received a result"
            );
        }
        AgentResult {
            queries: self.completed,
            final_answer,
        }
    }
}

/// Interprets tool result content as rows. A JSON array is taken as-is, a
/// JSON object becomes a one-row array, and anything else (including content
/// that is not JSON at all) is wrapped as `[{"result": <raw text>}]`.
pub fn parse_rows(content: &str) -> Vec<Value> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Array(rows)) => rows,
        Ok(object @ Value::Object(_)) => vec![object],
        _ => vec![serde_json::json!({ "result": content })],
    }
}
