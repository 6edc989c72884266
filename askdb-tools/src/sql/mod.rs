//! Read-only SQL execution and schema introspection for SQLite.
//!
//! Connections are opened read-only, per request, and closed when the request
//! completes. Queries are limited to SELECT and PRAGMA statements; see
//! [`executor`] for the validation layers.

use crate::tool_error::ToolError;
use crate::types::{
    DescribeSchemaResponse, QueryCheckerRequest, QuerySqlRequest, QuerySqlResponse, ToolResponse,
};
use serde_json::Value;

pub mod checker;
pub mod executor;

pub use executor::{QueryResult, SqlExecutor};

pub const DEFAULT_LIMIT: usize = 100;
pub const MAX_LIMIT: usize = 1000;
pub const TIMEOUT_MS: u64 = 5000;

/// Executes a SQL query and shapes the result for the LLM
pub async fn execute_query_sql(
    db_path: &str,
    request: QuerySqlRequest,
    default_limit: usize,
    timeout_ms: u64,
) -> Result<ToolResponse, ToolError> {
    validate_db_path(db_path)?;

    let limit = request.limit.unwrap_or(default_limit).min(MAX_LIMIT);

    let executor = SqlExecutor::new(db_path, MAX_LIMIT, timeout_ms)?;
    let result = executor.execute(&request.query, Some(limit))?;

    let objects = rows_to_objects(&result.columns, &result.rows);
    let rows_json = serde_json::to_string(&objects)
        .map_err(|e| ToolError::Execution(format!("Failed to serialize rows: {}", e)))?;

    Ok(ToolResponse::QuerySql(QuerySqlResponse {
        columns: result.columns,
        rows: result.rows,
        row_count: result.row_count,
        truncated: result.truncated,
        execution_time_ms: result.execution_time_ms,
        rows_json,
    }))
}

/// Reviews a SQL query without executing it
pub async fn execute_query_checker(
    request: QueryCheckerRequest,
) -> Result<ToolResponse, ToolError> {
    Ok(ToolResponse::QueryChecker(checker::check_query(
        &request.query,
    )))
}

/// Returns table and column metadata as text context
pub async fn execute_describe_schema(db_path: &str) -> Result<ToolResponse, ToolError> {
    let schema = describe_schema(db_path).await?;
    Ok(ToolResponse::DescribeSchema(DescribeSchemaResponse {
        schema,
    }))
}

/// Lists user table names, excluding SQLite internals
pub async fn get_table_names(db_path: &str) -> Result<Vec<String>, ToolError> {
    validate_db_path(db_path)?;

    let executor = SqlExecutor::new(db_path, MAX_LIMIT, TIMEOUT_MS)?;
    let query =
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";
    let result = executor.execute(query, None)?;

    let table_names = result
        .rows
        .iter()
        .filter_map(|row| match row.first() {
            Some(Value::String(name)) => Some(name.clone()),
            _ => None,
        })
        .collect();

    Ok(table_names)
}

/// Renders the full schema: CREATE statements plus per-table column info
pub async fn describe_schema(db_path: &str) -> Result<String, ToolError> {
    validate_db_path(db_path)?;

    let executor = SqlExecutor::new(db_path, MAX_LIMIT, TIMEOUT_MS)?;
    let tables = executor.execute(
        "SELECT name, sql FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        None,
    )?;

    if tables.row_count == 0 {
        return Ok("The database contains no tables.".to_string());
    }

    let mut output = String::new();
    for row in &tables.rows {
        let (Some(Value::String(name)), Some(create_sql)) = (row.first(), row.get(1)) else {
            continue;
        };

        if let Value::String(sql) = create_sql {
            output.push_str(sql);
            output.push_str(";\n");
        }

        let info = executor.execute(&format!("PRAGMA table_info({})", name), None)?;
        output.push_str(&format!("-- columns of {}:", name));
        for info_row in &info.rows {
            // PRAGMA table_info: cid, name, type, notnull, dflt_value, pk
            let col_name = info_row.get(1).and_then(Value::as_str).unwrap_or("?");
            let col_type = info_row.get(2).and_then(Value::as_str).unwrap_or("");
            output.push_str(&format!(" {} {},", col_name, col_type));
        }
        if output.ends_with(',') {
            output.pop();
        }
        output.push_str("\n\n");
    }

    Ok(output.trim_end().to_string())
}

/// Converts a columnar result to a JSON array of column->value objects
pub fn rows_to_objects(columns: &[String], rows: &[Vec<Value>]) -> Vec<Value> {
    rows.iter()
        .map(|row| {
            let mut object = serde_json::Map::with_capacity(columns.len());
            for (column, value) in columns.iter().zip(row.iter()) {
                object.insert(column.clone(), value.clone());
            }
            Value::Object(object)
        })
        .collect()
}

fn validate_db_path(db_path: &str) -> Result<(), ToolError> {
    if db_path.is_empty() {
        return Err(ToolError::InvalidInput(
            "Database path cannot be empty".to_string(),
        ));
    }

    let path = std::path::Path::new(db_path);
    if !path.exists() {
        return Err(ToolError::InvalidInput(format!(
            "Database file not found: {}",
            db_path
        )));
    }

    if !path.is_file() {
        return Err(ToolError::InvalidInput(format!(
            "Path is not a file: {}",
            db_path
        )));
    }

    Ok(())
}
