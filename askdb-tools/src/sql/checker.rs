//! Static review of SQL queries before execution.
//!
//! The checker never touches the database. It parses the query and reports
//! issues the agent should fix or at least be aware of before running it.

use sqlparser::ast::{Expr, Query, SelectItem, SetExpr, Statement};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use crate::types::QueryCheckerResponse;

/// Runs every static rule against the query and returns the combined verdict.
pub fn check_query(query: &str) -> QueryCheckerResponse {
    let mut issues = Vec::new();

    let trimmed = query.trim();
    if trimmed.is_empty() {
        return QueryCheckerResponse {
            issues: vec!["Query is empty".to_string()],
            verdict: "needs_revision".to_string(),
        };
    }

    let statements = match Parser::parse_sql(&SQLiteDialect {}, trimmed) {
        Ok(statements) => statements,
        Err(e) => {
            return QueryCheckerResponse {
                issues: vec![format!("Query does not parse: {}", e)],
                verdict: "needs_revision".to_string(),
            };
        }
    };

    if statements.len() > 1 {
        issues.push(format!(
            "Query contains {} statements; only one is allowed",
            statements.len()
        ));
    }

    match statements.first() {
        Some(Statement::Query(query)) => check_select(query, &mut issues),
        Some(Statement::Pragma { .. }) => {}
        Some(other) => issues.push(format!(
            "Only SELECT queries are allowed, found: {}",
            statement_kind(other)
        )),
        None => issues.push("Query is empty".to_string()),
    }

    let verdict = if issues
        .iter()
        .any(|issue| !issue.starts_with("Advisory:"))
    {
        "needs_revision".to_string()
    } else {
        "ok".to_string()
    };

    QueryCheckerResponse { issues, verdict }
}

fn check_select(query: &Query, issues: &mut Vec<String>) {
    if let SetExpr::Select(select) = query.body.as_ref() {
        let has_wildcard = select.projection.iter().any(|item| {
            matches!(
                item,
                SelectItem::Wildcard(_) | SelectItem::QualifiedWildcard(_, _)
            )
        });
        if has_wildcard {
            issues.push(
                "Advisory: SELECT * returns every column; prefer listing the columns you need"
                    .to_string(),
            );
        }

        if let Some(selection) = &select.selection {
            check_expr(selection, issues);
        }
    }

    if query.limit.is_none() && query.fetch.is_none() {
        issues.push(
            "Advisory: query has no LIMIT clause; a limit will be applied at execution time"
                .to_string(),
        );
    }
}

// NOT IN (subquery) is a classic SQLite trap: a single NULL in the subquery
// result makes the whole predicate return no rows.
fn check_expr(expr: &Expr, issues: &mut Vec<String>) {
    match expr {
        Expr::InSubquery { negated: true, .. } => {
            issues.push(
                "Advisory: NOT IN with a subquery returns no rows if the subquery yields any NULL; consider NOT EXISTS"
                    .to_string(),
            );
        }
        Expr::BinaryOp { left, right, .. } => {
            check_expr(left, issues);
            check_expr(right, issues);
        }
        Expr::UnaryOp { expr, .. } | Expr::Nested(expr) => check_expr(expr, issues),
        _ => {}
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Insert(_) => "INSERT",
        Statement::Update { .. } => "UPDATE",
        Statement::Delete(_) => "DELETE",
        Statement::Drop { .. } => "DROP",
        Statement::CreateTable(_) => "CREATE TABLE",
        Statement::AlterTable { .. } => "ALTER TABLE",
        _ => "a non-SELECT statement",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_query_passes() {
        let result = check_query("SELECT name FROM users WHERE id = 1 LIMIT 10");
        assert!(result.issues.is_empty());
        assert_eq!(result.verdict, "ok");
    }

    #[test]
    fn advisories_do_not_fail_the_verdict() {
        let result = check_query("SELECT * FROM users");
        assert_eq!(result.verdict, "ok");
        assert_eq!(result.issues.len(), 2);
        assert!(result.issues[0].contains("SELECT *"));
        assert!(result.issues[1].contains("LIMIT"));
    }

    #[test]
    fn parse_error_needs_revision() {
        let result = check_query("SELEC name FROM users");
        assert_eq!(result.verdict, "needs_revision");
        assert!(result.issues[0].contains("does not parse"));
    }

    #[test]
    fn mutation_needs_revision() {
        let result = check_query("DELETE FROM users");
        assert_eq!(result.verdict, "needs_revision");
        assert!(result.issues[0].contains("DELETE"));
    }

    #[test]
    fn multiple_statements_flagged() {
        let result = check_query("SELECT 1; SELECT 2");
        assert_eq!(result.verdict, "needs_revision");
        assert!(result.issues[0].contains("2 statements"));
    }

    #[test]
    fn not_in_subquery_gets_null_advisory() {
        let result = check_query(
            "SELECT name FROM users WHERE id NOT IN (SELECT user_id FROM posts) LIMIT 5",
        );
        assert_eq!(result.verdict, "ok");
        assert!(result.issues[0].contains("NOT IN"));
    }

    #[test]
    fn empty_query_needs_revision() {
        let result = check_query("   ");
        assert_eq!(result.verdict, "needs_revision");
    }
}
