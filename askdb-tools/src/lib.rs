//! Read-only SQLite tools for askdb agents.
//!
//! Every tool speaks the tagged [`types::ToolRequest`]/[`types::ToolResponse`]
//! contract and never panics into its caller: SQL faults come back as
//! [`ToolError::Sql`] so the agent layer can surface them to the model as
//! plain text.

pub mod markdown;
pub mod sql;
pub mod tool_error;
pub mod tool_executor;
pub mod types;

pub use tool_error::ToolError;
pub use tool_executor::ToolExecutor;
pub use types::*;
