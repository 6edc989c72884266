pub mod config;
pub mod error;
pub mod pipeline;
pub mod sql_agent;
pub mod trace;
pub mod transcript;

#[cfg(test)]
mod test_support;

pub use error::AgentError;
pub use pipeline::DirectPipeline;
pub use sql_agent::{SqlAgent, SqlAgentConfig};
pub use trace::{AgentResult, QueryResult};

use askdb_tools::types::{
    DescribeSchemaRequest, QueryCheckerRequest, QuerySqlRequest, ToolRequest, ToolResponse,
};

/// Represents the types of tools available to agents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentTool {
    QuerySql,
    QueryChecker,
    DescribeSchema,
}

impl AgentTool {
    /// Returns the tool name as used in ToolRequest
    pub fn name(&self) -> &'static str {
        match self {
            AgentTool::QuerySql => "query_sql",
            AgentTool::QueryChecker => "query_checker",
            AgentTool::DescribeSchema => "describe_schema",
        }
    }

    pub fn all() -> Vec<AgentTool> {
        vec![
            AgentTool::QuerySql,
            AgentTool::QueryChecker,
            AgentTool::DescribeSchema,
        ]
    }

    /// Convert AgentTool to an askdb-llm-sdk Tool definition for the LLM
    pub fn to_tool_definition(&self) -> askdb_llm_sdk::tools::Tool {
        use askdb_llm_sdk::tools::Tool;

        match self {
            AgentTool::QuerySql => Tool::from_type::<QuerySqlRequest>()
                .name(self.name())
                .description(
                    "Execute a read-only SQL query against the SQLite database and return the matching rows as JSON.",
                )
                .build(),
            AgentTool::QueryChecker => Tool::from_type::<QueryCheckerRequest>()
                .name(self.name())
                .description(
                    "Review a SQL query for problems without executing it. Returns a verdict and a list of issues.",
                )
                .build(),
            AgentTool::DescribeSchema => Tool::from_type::<DescribeSchemaRequest>()
                .name(self.name())
                .description(
                    "Return the CREATE TABLE statements and column listing for every table in the database.",
                )
                .build(),
        }
    }

    /// Parse an LLM tool call into a typed ToolRequest
    pub fn parse_tool_call(
        name: &str,
        arguments: serde_json::Value,
    ) -> anyhow::Result<ToolRequest> {
        let request = match name {
            "query_sql" => {
                let req: QuerySqlRequest = serde_json::from_value(arguments)?;
                ToolRequest::QuerySql(req)
            }
            "query_checker" => {
                let req: QueryCheckerRequest = serde_json::from_value(arguments)?;
                ToolRequest::QueryChecker(req)
            }
            "describe_schema" => {
                let req: DescribeSchemaRequest = serde_json::from_value(arguments)?;
                ToolRequest::DescribeSchema(req)
            }
            _ => anyhow::bail!("Unknown tool: {}", name),
        };

        Ok(request)
    }
}

/// Format ToolResponse for display to the LLM
pub fn format_tool_response(response: &ToolResponse) -> String {
    match response {
        ToolResponse::QuerySql(r) => r.rows_json.clone(),
        ToolResponse::QueryChecker(r) => {
            if r.issues.is_empty() {
                format!("Verdict: {}", r.verdict)
            } else {
                format!("Verdict: {}\nIssues:\n- {}", r.verdict, r.issues.join("\n- "))
            }
        }
        ToolResponse::DescribeSchema(r) => r.schema.clone(),
        ToolResponse::Error(e) => format!("Error: {}", e.message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_known_tool_calls() {
        let request =
            AgentTool::parse_tool_call("query_sql", json!({"query": "SELECT 1"})).unwrap();
        assert!(matches!(request, ToolRequest::QuerySql(_)));

        let request =
            AgentTool::parse_tool_call("query_checker", json!({"query": "SELECT 1"})).unwrap();
        assert!(matches!(request, ToolRequest::QueryChecker(_)));

        let request = AgentTool::parse_tool_call("describe_schema", json!({})).unwrap();
        assert!(matches!(request, ToolRequest::DescribeSchema(_)));
    }

    #[test]
    fn unknown_tool_is_an_error() {
        let err = AgentTool::parse_tool_call("drop_tables", json!({}));
        assert!(err.is_err());
    }

    #[test]
    fn query_sql_response_formats_as_rows_json() {
        let response = ToolResponse::QuerySql(askdb_tools::types::QuerySqlResponse {
            columns: vec!["n".to_string()],
            rows: vec![vec![json!(1)]],
            row_count: 1,
            truncated: false,
            execution_time_ms: 0,
            rows_json: r#"[{"n":1}]"#.to_string(),
        });
        assert_eq!(format_tool_response(&response), r#"[{"n":1}]"#);
    }

    #[test]
    fn tool_definitions_carry_schemas() {
        for tool in AgentTool::all() {
            let definition = tool.to_tool_definition();
            assert_eq!(definition.name(), tool.name());
            assert!(!definition.description().is_empty());
        }
    }
}
