//! Response text for MCP tools.
//!
//! Every successful tool call returns a single text block built here.

use crate::models::ResultRow;

pub const TABLE_CREATED: &str = "Table created successfully";

fn bracketed<T: std::fmt::Display>(items: &[T]) -> String {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}

/// `Query results: [{col: value, ...}, ...]`
pub fn query_results(rows: &[ResultRow]) -> String {
    format!("Query results: {}", bracketed(rows))
}

/// `Operation successful. Rows affected: N`
pub fn rows_affected(count: u64) -> String {
    format!("Operation successful. Rows affected: {}", count)
}

/// `Tables: [a, b]`
pub fn tables(names: &[String]) -> String {
    format!("Tables: {}", bracketed(names))
}

/// One line of plan text per row. Multi-column plan rows (SQLite) are
/// tab-separated.
pub fn plan_line(row: &ResultRow) -> String {
    row.values()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\t")
}

/// `Execution plan:\n` followed by each line and a newline.
pub fn execution_plan(lines: &[String]) -> String {
    let mut out = String::from("Execution plan:\n");
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}
