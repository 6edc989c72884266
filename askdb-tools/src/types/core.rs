use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool request enum containing all tool operations available to the agent
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum ToolRequest {
    #[serde(rename = "query_sql")]
    QuerySql(super::sql::QuerySqlRequest),
    #[serde(rename = "query_checker")]
    QueryChecker(super::sql::QueryCheckerRequest),
    #[serde(rename = "describe_schema")]
    DescribeSchema(super::sql::DescribeSchemaRequest),
}

/// Tool response enum containing all tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolResponse {
    #[serde(rename = "query_sql")]
    QuerySql(super::sql::QuerySqlResponse),
    #[serde(rename = "query_checker")]
    QueryChecker(super::sql::QueryCheckerResponse),
    #[serde(rename = "describe_schema")]
    DescribeSchema(super::sql::DescribeSchemaResponse),
    #[serde(rename = "error")]
    Error(ToolErrorResponse),
}

/// Error response for tool execution failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolErrorResponse {
    pub tool: String,
    pub error: String,
    pub message: String,
}
