//! SQLite query executor with read-only validation.
//!
//! Queries are validated before execution with several complementary layers:
//!
//! 1. **Single statement enforcement** — multi-statement input is rejected.
//! 2. **AST parsing** — queries are parsed with the `sqlparser` SQLite
//!    dialect; only SELECT queries and PRAGMA statements are allowed.
//! 3. **Recursive body validation** — subqueries, joins and derived tables
//!    are inspected for hidden statements.
//! 4. **Keyword scanning** — a final word-boundary scan for mutating
//!    keywords.
//! 5. **Row limits** — a LIMIT clause is injected into SELECTs that lack one.

use crate::tool_error::ToolError;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;
use sqlparser::ast::{Expr, SetExpr, Statement, TableFactor, TableWithJoins};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use std::time::{Duration, Instant};

/// Structured result of a single query execution
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub row_count: usize,
    pub truncated: bool,
    pub execution_time_ms: u64,
}

enum StatementKind {
    Select { has_limit: bool },
    Pragma,
}

pub struct SqlExecutor {
    conn: Connection,
    max_rows: usize,
}

impl SqlExecutor {
    /// Opens the database read-only with a busy timeout
    pub fn new(db_path: &str, max_rows: usize, timeout_ms: u64) -> Result<Self, ToolError> {
        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| ToolError::Execution(format!("Failed to open database: {}", e)))?;
        conn.busy_timeout(Duration::from_millis(timeout_ms))
            .map_err(|e| ToolError::Execution(format!("Failed to set busy timeout: {}", e)))?;

        Ok(Self { conn, max_rows })
    }

    /// Executes a validated query and returns structured results
    pub fn execute(&self, query: &str, limit: Option<usize>) -> Result<QueryResult, ToolError> {
        let start_time = Instant::now();

        let kind = validate_query(query)?;

        let effective_limit = limit.unwrap_or(self.max_rows).min(self.max_rows);

        // Fetch one row past the limit so truncation is detectable
        let final_query = match kind {
            StatementKind::Select { has_limit: false } => {
                let trimmed = query.trim().trim_end_matches(';');
                tracing::debug!(limit = effective_limit, "Adding LIMIT to query");
                format!("{} LIMIT {}", trimmed, effective_limit + 1)
            }
            _ => query.trim().trim_end_matches(';').to_string(),
        };

        let mut stmt = self
            .conn
            .prepare(&final_query)
            .map_err(|e| ToolError::Sql(format!("Query preparation failed: {}", e)))?;

        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut result_rows: Vec<Vec<Value>> = Vec::new();
        let mut truncated = false;

        let mut rows = stmt
            .query([])
            .map_err(|e| ToolError::Sql(format!("Query execution failed: {}", e)))?;

        loop {
            let row = rows
                .next()
                .map_err(|e| ToolError::Sql(format!("Query execution failed: {}", e)))?;
            let Some(row) = row else { break };

            if result_rows.len() >= effective_limit {
                truncated = true;
                break;
            }

            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value_ref = row
                    .get_ref(i)
                    .map_err(|e| ToolError::Sql(format!("Failed to read column {}: {}", i, e)))?;
                values.push(json_value(value_ref));
            }
            result_rows.push(values);
        }

        let row_count = result_rows.len();
        let execution_time_ms = start_time.elapsed().as_millis() as u64;

        Ok(QueryResult {
            columns,
            rows: result_rows,
            row_count,
            truncated,
            execution_time_ms,
        })
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Number(i.into()),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(format!("<blob {} bytes>", b.len())),
    }
}

/// Validates a SQL query to ensure it's a single read-only statement
fn validate_query(query: &str) -> Result<StatementKind, ToolError> {
    if query.trim().is_empty() {
        return Err(ToolError::InvalidInput("Query cannot be empty".to_string()));
    }

    let dialect = SQLiteDialect {};
    let statements = Parser::parse_sql(&dialect, query)
        .map_err(|e| ToolError::Sql(format!("Failed to parse SQL: {}", e)))?;

    if statements.is_empty() {
        return Err(ToolError::Sql("Empty SQL statement".to_string()));
    }

    if statements.len() > 1 {
        return Err(ToolError::Sql(
            "Multiple SQL statements are not allowed".to_string(),
        ));
    }

    let kind = match &statements[0] {
        Statement::Query(q) => {
            validate_query_body(&q.body)?;
            StatementKind::Select {
                has_limit: q.limit.is_some() || q.fetch.is_some(),
            }
        }
        Statement::Pragma { .. } => StatementKind::Pragma,
        _ => {
            return Err(ToolError::Sql(
                "Only SELECT queries and PRAGMA statements are allowed".to_string(),
            ))
        }
    };

    let dangerous_keywords = [
        "DROP", "DELETE", "UPDATE", "INSERT", "CREATE", "ALTER", "TRUNCATE", "ATTACH", "DETACH",
        "VACUUM", "REINDEX",
    ];

    let query_upper = query.to_uppercase();
    for keyword in &dangerous_keywords {
        let pattern = regex::Regex::new(&format!(r"\b{}\b", keyword)).unwrap();
        if pattern.is_match(&query_upper) {
            return Err(ToolError::Sql(format!(
                "Use of '{}' is not allowed in queries",
                keyword
            )));
        }
    }

    Ok(kind)
}

/// Recursively validates query body (subqueries, set operations)
fn validate_query_body(set_expr: &SetExpr) -> Result<(), ToolError> {
    match set_expr {
        SetExpr::Select(select) => {
            for table_with_joins in &select.from {
                validate_table_with_joins(table_with_joins)?;
            }
            if let Some(where_clause) = &select.selection {
                validate_expr(where_clause)?;
            }
        }
        SetExpr::Query(query) => {
            validate_query_body(&query.body)?;
        }
        SetExpr::SetOperation { left, right, .. } => {
            validate_query_body(left)?;
            validate_query_body(right)?;
        }
        _ => {
            return Err(ToolError::Sql(
                "Only SELECT queries are allowed".to_string(),
            ))
        }
    }
    Ok(())
}

fn validate_table_with_joins(table_with_joins: &TableWithJoins) -> Result<(), ToolError> {
    validate_table_factor(&table_with_joins.relation)?;
    for join in &table_with_joins.joins {
        validate_table_factor(&join.relation)?;
    }
    Ok(())
}

fn validate_table_factor(table_factor: &TableFactor) -> Result<(), ToolError> {
    match table_factor {
        TableFactor::Table { .. } => {}
        TableFactor::Derived { subquery, .. } => {
            validate_query_body(&subquery.body)?;
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            validate_table_with_joins(table_with_joins)?;
        }
        _ => {}
    }
    Ok(())
}

/// Validates expressions (WHERE clauses, subqueries in expressions)
fn validate_expr(expr: &Expr) -> Result<(), ToolError> {
    match expr {
        Expr::Subquery(subquery) => {
            validate_query_body(&subquery.body)?;
        }
        Expr::InSubquery { subquery, .. } => {
            validate_query_body(&subquery.body)?;
        }
        Expr::Exists { subquery, .. } => {
            validate_query_body(&subquery.body)?;
        }
        Expr::BinaryOp { left, right, .. } => {
            validate_expr(left)?;
            validate_expr(right)?;
        }
        Expr::UnaryOp { expr, .. } => {
            validate_expr(expr)?;
        }
        Expr::Nested(expr) => {
            validate_expr(expr)?;
        }
        _ => {}
    }
    Ok(())
}
