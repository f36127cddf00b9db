//! Catalog queries.
//!
//! `list_tables_sql` is the only place the listing statement is assembled.
//! The schema filter is interpolated after quote-escaping; callers must pass
//! the raw user value exactly once.

use crate::models::DatabaseType;
use crate::tools::sanitizer::sanitize;

const POSTGRES_TABLES: &str = "SELECT tablename FROM pg_catalog.pg_tables \
     WHERE schemaname NOT IN ('pg_catalog', 'information_schema')";

const SQLITE_TABLES: &str = "SELECT name FROM pragma_table_list \
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'";

/// Build the statement listing user tables, optionally limited to one schema.
pub fn list_tables_sql(db_type: DatabaseType, schema: Option<&str>) -> String {
    let (base, schema_column) = match db_type {
        DatabaseType::PostgreSQL => (POSTGRES_TABLES, "schemaname"),
        DatabaseType::SQLite => (SQLITE_TABLES, "schema"),
    };

    match schema {
        Some(schema) => format!("{} AND {} = '{}'", base, schema_column, sanitize(schema)),
        None => base.to_string(),
    }
}
