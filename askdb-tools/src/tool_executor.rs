//! Dispatches typed tool requests to their implementations.

use tracing::debug;

use crate::sql;
use crate::tool_error::ToolError;
use crate::types::{ToolRequest, ToolResponse};

/// Executes tool requests against a single SQLite database.
#[derive(Debug, Clone)]
pub struct ToolExecutor {
    db_path: String,
    default_limit: usize,
    timeout_ms: u64,
}

impl ToolExecutor {
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            default_limit: sql::DEFAULT_LIMIT,
            timeout_ms: sql::TIMEOUT_MS,
        }
    }

    pub fn with_default_limit(mut self, default_limit: usize) -> Self {
        self.default_limit = default_limit;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    pub async fn execute(&self, request: ToolRequest) -> Result<ToolResponse, ToolError> {
        match request {
            ToolRequest::QuerySql(req) => {
                debug!(query = %req.query, "Executing query_sql");
                sql::execute_query_sql(&self.db_path, req, self.default_limit, self.timeout_ms)
                    .await
            }
            ToolRequest::QueryChecker(req) => {
                debug!(query = %req.query, "Executing query_checker");
                sql::execute_query_checker(req).await
            }
            ToolRequest::DescribeSchema(_) => {
                debug!("Executing describe_schema");
                sql::execute_describe_schema(&self.db_path).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DescribeSchemaRequest, QueryCheckerRequest, QuerySqlRequest};
    use rusqlite::Connection;
    use tempfile::NamedTempFile;

    fn seeded_db() -> (NamedTempFile, String) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT);
             INSERT INTO items (label) VALUES ('one'), ('two'), ('three');",
        )
        .unwrap();
        drop(conn);
        (temp_file, path)
    }

    #[tokio::test]
    async fn dispatches_query_sql() {
        let (_guard, path) = seeded_db();
        let executor = ToolExecutor::new(&path);

        let response = executor
            .execute(ToolRequest::QuerySql(QuerySqlRequest {
                query: "SELECT label FROM items ORDER BY id".to_string(),
                limit: Some(2),
            }))
            .await
            .unwrap();

        let ToolResponse::QuerySql(result) = response else {
            panic!("Expected QuerySql response");
        };
        assert_eq!(result.row_count, 2);
        assert!(result.truncated);
    }

    #[tokio::test]
    async fn dispatches_query_checker_without_database() {
        // The checker never opens the database, so a bogus path is fine.
        let executor = ToolExecutor::new("/nonexistent.db");

        let response = executor
            .execute(ToolRequest::QueryChecker(QueryCheckerRequest {
                query: "SELECT 1 LIMIT 1".to_string(),
            }))
            .await
            .unwrap();

        let ToolResponse::QueryChecker(result) = response else {
            panic!("Expected QueryChecker response");
        };
        assert_eq!(result.verdict, "ok");
    }

    #[tokio::test]
    async fn dispatches_describe_schema() {
        let (_guard, path) = seeded_db();
        let executor = ToolExecutor::new(&path);

        let response = executor
            .execute(ToolRequest::DescribeSchema(DescribeSchemaRequest {}))
            .await
            .unwrap();

        let ToolResponse::DescribeSchema(result) = response else {
            panic!("Expected DescribeSchema response");
        };
        assert!(result.schema.contains("CREATE TABLE items"));
    }

    #[tokio::test]
    async fn default_limit_caps_results() {
        let (_guard, path) = seeded_db();
        let executor = ToolExecutor::new(&path).with_default_limit(1);

        let response = executor
            .execute(ToolRequest::QuerySql(QuerySqlRequest {
                query: "SELECT label FROM items".to_string(),
                limit: None,
            }))
            .await
            .unwrap();

        let ToolResponse::QuerySql(result) = response else {
            panic!("Expected QuerySql response");
        };
        assert_eq!(result.row_count, 1);
        assert!(result.truncated);
    }
}
