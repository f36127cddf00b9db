//! Write operation tools.
//!
//! This module implements the `write_query` MCP tool for INSERT, UPDATE and
//! DELETE statements, and the `create_table` tool for CREATE TABLE.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::DbResult;
use crate::tools::args::{ArgValue, require_string};
use crate::tools::classifier::StatementCategory;
use crate::tools::format;
use crate::tools::guard::ensure_category;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the write_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct WriteQueryInput {
    /// SQL query to execute (INSERT, UPDATE, DELETE)
    #[schemars(with = "String")]
    pub query: Option<ArgValue>,
}

/// Input for the create_table tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CreateTableInput {
    /// CREATE TABLE SQL statement
    #[schemars(with = "String")]
    pub schema: Option<ArgValue>,
}

pub struct WriteToolHandler {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl WriteToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self::with_executor(connection_manager, QueryExecutor::new())
    }

    pub fn with_executor(
        connection_manager: Arc<ConnectionManager>,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            connection_manager,
            executor,
        }
    }

    pub async fn write_query(&self, input: WriteQueryInput) -> DbResult<String> {
        let query = require_string(input.query, "invalid query parameter")?;
        ensure_category(
            "write_query",
            &query,
            StatementCategory::Write,
            self.connection_manager.db_type(),
        )?;

        let (rows_affected, execution_time_ms) = self
            .executor
            .execute(self.connection_manager.pool(), &query)
            .await
            .map_err(|e| e.relabel("write operation failed", "write operation failed"))?;

        info!(
            tool = "write_query",
            rows_affected = rows_affected,
            execution_time_ms = execution_time_ms,
            "Write operation executed"
        );

        Ok(format::rows_affected(rows_affected))
    }

    pub async fn create_table(&self, input: CreateTableInput) -> DbResult<String> {
        let schema = require_string(input.schema, "invalid schema parameter")?;
        ensure_category(
            "create_table",
            &schema,
            StatementCategory::Create,
            self.connection_manager.db_type(),
        )?;

        let (_, execution_time_ms) = self
            .executor
            .execute(self.connection_manager.pool(), &schema)
            .await
            .map_err(|e| e.relabel("table creation failed", "table creation failed"))?;

        info!(
            tool = "create_table",
            execution_time_ms = execution_time_ms,
            "Table created"
        );

        Ok(format::TABLE_CREATED.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use crate::error::DbError;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn handler() -> WriteToolHandler {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let manager = Arc::new(ConnectionManager::from_pool(DbPool::SQLite(pool)));
        WriteToolHandler::new(manager)
    }

    fn text(s: &str) -> Option<ArgValue> {
        Some(ArgValue::Text(s.to_string()))
    }

    #[test]
    fn test_write_query_input_deserialization() {
        let input: WriteQueryInput =
            serde_json::from_str(r#"{"query": "DELETE FROM users"}"#).unwrap();
        assert_eq!(input.query, text("DELETE FROM users"));

        let input: CreateTableInput = serde_json::from_str(r#"{"schema": null}"#).unwrap();
        assert!(input.schema.is_none());
    }

    #[tokio::test]
    async fn test_create_then_write() {
        let handler = handler().await;

        let out = handler
            .create_table(CreateTableInput {
                schema: text("CREATE TABLE users (id INTEGER, name TEXT)"),
            })
            .await
            .unwrap();
        assert_eq!(out, "Table created successfully");

        let out = handler
            .write_query(WriteQueryInput {
                query: text("INSERT INTO users VALUES (1, 'a'), (2, 'b')"),
            })
            .await
            .unwrap();
        assert_eq!(out, "Operation successful. Rows affected: 2");

        let out = handler
            .write_query(WriteQueryInput {
                query: text("UPDATE users SET name = 'c' WHERE id = 99"),
            })
            .await
            .unwrap();
        assert_eq!(out, "Operation successful. Rows affected: 0");
    }

    #[tokio::test]
    async fn test_write_query_rejects_select() {
        let handler = handler().await;
        let err = handler
            .write_query(WriteQueryInput {
                query: text("SELECT 1"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::DisallowedStatement { .. }));
        assert_eq!(
            err.to_string(),
            "only INSERT/UPDATE/DELETE queries are allowed"
        );
    }

    #[tokio::test]
    async fn test_write_query_wrong_type() {
        let handler = handler().await;
        let err = handler
            .write_query(WriteQueryInput {
                query: Some(ArgValue::Bool(true)),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid query parameter");
    }

    #[tokio::test]
    async fn test_write_query_backend_failure() {
        let handler = handler().await;
        let err = handler
            .write_query(WriteQueryInput {
                query: text("INSERT INTO missing VALUES (1)"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "write operation failed");
        assert!(err.detail().unwrap().contains("missing"));
    }

    #[tokio::test]
    async fn test_create_table_rejections() {
        let handler = handler().await;

        let err = handler
            .create_table(CreateTableInput {
                schema: text("CREATE INDEX i ON t (id)"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid CREATE TABLE statement");

        let err = handler
            .create_table(CreateTableInput { schema: None })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid schema parameter");

        handler
            .create_table(CreateTableInput {
                schema: text("CREATE TABLE dup (id INTEGER)"),
            })
            .await
            .unwrap();
        let err = handler
            .create_table(CreateTableInput {
                schema: text("CREATE TABLE dup (id INTEGER)"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "table creation failed");
    }
}
