//! Markdown rendering of query results for terminal output.

use serde_json::Value;

const MAX_CELL_LEN: usize = 50;

/// Renders a JSON array of objects as a Markdown table.
///
/// Column order follows the first row. Rows that are not objects are rendered
/// under a single `value` column. An empty slice renders as a note instead of
/// a headerless table.
pub fn rows_to_table(rows: &[Value]) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }

    let columns: Vec<String> = match rows.first() {
        Some(Value::Object(object)) => object.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    };

    let mut output = String::new();
    output.push_str("| ");
    output.push_str(&columns.join(" | "));
    output.push_str(" |\n|");
    for _ in &columns {
        output.push_str(" --- |");
    }
    output.push('\n');

    for row in rows {
        output.push('|');
        match row {
            Value::Object(object) => {
                for column in &columns {
                    let cell = object.get(column).map(render_cell).unwrap_or_default();
                    output.push_str(&format!(" {} |", cell));
                }
            }
            other => {
                output.push_str(&format!(" {} |", render_cell(other)));
            }
        }
        output.push('\n');
    }

    output.trim_end().to_string()
}

fn render_cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let escaped = text.replace('|', "\\|").replace('\n', " ");
    if escaped.chars().count() > MAX_CELL_LEN {
        let truncated: String = escaped.chars().take(MAX_CELL_LEN).collect();
        format!("{}...", truncated)
    } else {
        escaped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_objects_as_table() {
        let rows = vec![
            json!({"name": "alice", "count": 3}),
            json!({"name": "bob", "count": 1}),
        ];
        let table = rows_to_table(&rows);
        assert_eq!(
            table,
            "| name | count |\n| --- | --- |\n| alice | 3 |\n| bob | 1 |"
        );
    }

    #[test]
    fn empty_rows_render_note() {
        assert_eq!(rows_to_table(&[]), "(no rows)");
    }

    #[test]
    fn scalar_rows_use_value_column() {
        let rows = vec![json!(5)];
        let table = rows_to_table(&rows);
        assert!(table.starts_with("| value |"));
        assert!(table.contains("| 5 |"));
    }

    #[test]
    fn null_renders_empty_cell() {
        let rows = vec![json!({"email": null})];
        let table = rows_to_table(&rows);
        assert!(table.ends_with("|  |"));
    }

    #[test]
    fn pipes_are_escaped_and_long_cells_truncated() {
        let rows = vec![json!({"text": format!("a|b{}", "x".repeat(100))})];
        let table = rows_to_table(&rows);
        assert!(table.contains("a\\|b"));
        assert!(table.contains("..."));
    }

    #[test]
    fn missing_keys_render_empty() {
        let rows = vec![json!({"a": 1, "b": 2}), json!({"a": 3})];
        let table = rows_to_table(&rows);
        assert!(table.contains("| 3 |  |"));
    }
}
