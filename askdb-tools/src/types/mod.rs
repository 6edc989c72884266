pub mod core;
pub mod sql;

pub use self::core::{ToolErrorResponse, ToolRequest, ToolResponse};
pub use sql::{
    DescribeSchemaRequest, DescribeSchemaResponse, QueryCheckerRequest, QueryCheckerResponse,
    QuerySqlRequest, QuerySqlResponse,
};
