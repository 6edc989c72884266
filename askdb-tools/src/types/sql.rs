use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuerySqlRequest {
    #[schemars(
        description = "SQL query to execute. Only SELECT queries and PRAGMA statements are allowed."
    )]
    pub query: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Maximum number of rows to return. Defaults to 100, maximum 1000.")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuerySqlResponse {
    pub columns: Vec<String>,

    pub rows: Vec<Vec<serde_json::Value>>,

    pub row_count: usize,

    pub truncated: bool,

    pub execution_time_ms: u64,

    /// The result set as a JSON array of column->value objects. This is the
    /// text surfaced to the LLM and re-parsed by the trace capture.
    pub rows_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryCheckerRequest {
    #[schemars(description = "SQL query to review without executing it")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QueryCheckerResponse {
    /// Problems found, empty when the query looks fine
    pub issues: Vec<String>,

    /// One-line summary of the review
    pub verdict: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescribeSchemaRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DescribeSchemaResponse {
    /// Table and column metadata rendered as text context for the LLM
    pub schema: String,
}
