use thiserror::Error;

/// Error types for tool execution
#[derive(Debug, Error)]
pub enum ToolError {
    /// The request itself is malformed (bad path, empty query, unknown target)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The SQL statement failed validation or execution. In the agent path
    /// this is surfaced to the model as tool content, never thrown.
    #[error("SQL error: {0}")]
    Sql(String),

    /// A tool's own internal fault, distinct from a SQL failure
    #[error("Tool execution failed: {0}")]
    Execution(String),
}
