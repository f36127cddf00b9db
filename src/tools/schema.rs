//! Schema introspection tools.
//!
//! This module implements the `list_tables` MCP tool.

use crate::db::catalog::list_tables_sql;
use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::models::{CellValue, ResultRow};
use crate::tools::args::{ArgValue, optional_string};
use crate::tools::format;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the list_tables tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct ListTablesInput {
    /// Optional schema name to filter tables
    #[serde(default)]
    #[schemars(with = "Option<String>")]
    pub schema: Option<ArgValue>,
}

/// Handler for schema introspection tools.
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl SchemaToolHandler {
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

    /// List user tables, optionally limited to one schema.
    pub async fn list_tables(&self, input: ListTablesInput) -> DbResult<String> {
        let schema = optional_string(input.schema, "invalid schema parameter")?;
        let sql = list_tables_sql(self.connection_manager.db_type(), schema.as_deref());

        let (rows, execution_time_ms) = self
            .executor
            .fetch_rows(self.connection_manager.pool(), &sql)
            .await
            .map_err(|e| e.relabel("failed to list tables", "error scanning table name"))?;

        let names = rows
            .iter()
            .map(table_name)
            .collect::<DbResult<Vec<_>>>()?;

        info!(
            tool = "list_tables",
            schema = schema.as_deref().unwrap_or("*"),
            table_count = names.len(),
            execution_time_ms = execution_time_ms,
            "Listed tables"
        );

        Ok(format::tables(&names))
    }
}

fn table_name(row: &ResultRow) -> DbResult<String> {
    match row.values().next() {
        Some(CellValue::Text(name)) => Ok(name.clone()),
        other => Err(DbError::decode(format!("unexpected table name cell: {:?}", other))
            .relabel("failed to list tables", "error scanning table name")),
    }
}
