//! Statement classification by leading keyword.
//!
//! Each tool accepts exactly one category of statement. A statement belongs
//! to a category when its text, after leading whitespace, starts with one of
//! the category's keywords (case-insensitive). Nothing after the first
//! keyword is inspected, so `SELECT 1; DROP TABLE t` classifies as a read.
//! [`statement_count`] lets callers flag such payloads.

use crate::models::DatabaseType;
use regex::Regex;
use sqlparser::dialect::{Dialect, PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use std::sync::LazyLock;

static READ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*SELECT").expect("Invalid regex"));
static WRITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(INSERT|UPDATE|DELETE)").expect("Invalid regex"));
static CREATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*CREATE TABLE").expect("Invalid regex"));
static EXPLAIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*EXPLAIN").expect("Invalid regex"));

/// Category of statement a tool accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCategory {
    /// `SELECT`
    Read,
    /// `INSERT`, `UPDATE` or `DELETE`
    Write,
    /// `CREATE TABLE`
    Create,
    /// `EXPLAIN`
    Explain,
}

impl StatementCategory {
    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Read => &READ_RE,
            Self::Write => &WRITE_RE,
            Self::Create => &CREATE_RE,
            Self::Explain => &EXPLAIN_RE,
        }
    }

    /// Message returned to the caller when a statement is rejected.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            Self::Read => "only SELECT queries are allowed",
            Self::Write => "only INSERT/UPDATE/DELETE queries are allowed",
            Self::Create => "invalid CREATE TABLE statement",
            Self::Explain => "invalid explain schema parameter",
        }
    }
}

/// Whether `text` starts with a keyword of `category`.
pub fn classify(text: &str, category: StatementCategory) -> bool {
    category.pattern().is_match(text)
}

fn dialect_for(db_type: DatabaseType) -> Box<dyn Dialect> {
    match db_type {
        DatabaseType::PostgreSQL => Box::new(PostgreSqlDialect {}),
        DatabaseType::SQLite => Box::new(SQLiteDialect {}),
    }
}

/// Number of statements in `sql`, or `None` if it does not parse.
///
/// Parsing is advisory only; the backend remains the judge of validity.
pub fn statement_count(sql: &str, db_type: DatabaseType) -> Option<usize> {
    let dialect = dialect_for(db_type);
    Parser::parse_sql(dialect.as_ref(), sql)
        .ok()
        .map(|statements| statements.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use StatementCategory::*;

    #[test]
    fn test_read() {
        assert!(classify("SELECT 1", Read));
        assert!(classify("   select * from t", Read));
        assert!(classify("\n\tSeLeCt x", Read));
        assert!(!classify("DELETE FROM t", Read));
        assert!(!classify("WITH x AS (SELECT 1) SELECT * FROM x", Read));
    }

    #[test]
    fn test_write() {
        assert!(classify("INSERT INTO t VALUES (1)", Write));
        assert!(classify("update t set a = 1", Write));
        assert!(classify("  Delete from t", Write));
        assert!(!classify("SELECT 1", Write));
        assert!(!classify("MERGE INTO t", Write));
    }

    #[test]
    fn test_create() {
        assert!(classify("CREATE TABLE t (id int)", Create));
        assert!(classify("create table t (id int)", Create));
        assert!(!classify("CREATE INDEX i ON t (id)", Create));
        assert!(!classify("CREATE  TABLE t (id int)", Create));
        assert!(!classify("CREATE TEMP TABLE t (id int)", Create));
    }

    #[test]
    fn test_explain() {
        assert!(classify("EXPLAIN SELECT 1", Explain));
        assert!(classify("explain analyze select 1", Explain));
        assert!(!classify("SELECT 1", Explain));
    }

    #[test]
    fn test_empty_never_matches() {
        for category in [Read, Write, Create, Explain] {
            assert!(!classify("", category));
            assert!(!classify("   \n\t", category));
        }
    }

    #[test]
    fn test_prefix_only() {
        // Only the leading keyword is inspected.
        assert!(classify("SELECT 1; DROP TABLE t", Read));
        // Keyword prefix of a longer word still matches.
        assert!(classify("SELECTED", Read));
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Read.rejection_message(), "only SELECT queries are allowed");
        assert_eq!(
            Write.rejection_message(),
            "only INSERT/UPDATE/DELETE queries are allowed"
        );
        assert_eq!(Create.rejection_message(), "invalid CREATE TABLE statement");
        assert_eq!(Explain.rejection_message(), "invalid explain schema parameter");
    }

    #[test]
    fn test_statement_count() {
        assert_eq!(
            statement_count("SELECT 1", DatabaseType::PostgreSQL),
            Some(1)
        );
        assert_eq!(
            statement_count("SELECT 1; DROP TABLE t", DatabaseType::PostgreSQL),
            Some(2)
        );
        assert_eq!(
            statement_count("INSERT INTO t VALUES (1); DELETE FROM t", DatabaseType::SQLite),
            Some(2)
        );
        assert_eq!(statement_count("NOT SQL AT ALL", DatabaseType::SQLite), None);
    }
}
