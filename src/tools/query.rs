//! Query execution tool.
//!
//! This module implements the `read_query` MCP tool for executing SELECT
//! queries. Statements with any other leading keyword are rejected before
//! they reach the database.

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

/// Input for the read_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadQueryInput {
    /// SELECT SQL query to execute
    #[schemars(with = "String")]
    pub query: Option<ArgValue>,
}

/// Handler for query execution.
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl QueryToolHandler {
    /// Create a new query tool handler.
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self::with_executor(connection_manager, QueryExecutor::new())
    }

    /// Create a new query tool handler with custom executor settings.
    pub fn with_executor(
        connection_manager: Arc<ConnectionManager>,
        executor: QueryExecutor,
    ) -> Self {
        Self {
            connection_manager,
            executor,
        }
    }

    /// Handle the read_query tool call.
    pub async fn read_query(&self, input: ReadQueryInput) -> DbResult<String> {
        let query = require_string(input.query, "invalid query parameter")?;
        ensure_category(
            "read_query",
            &query,
            StatementCategory::Read,
            self.connection_manager.db_type(),
        )?;

        let (rows, execution_time_ms) = self
            .executor
            .fetch_rows(self.connection_manager.pool(), &query)
            .await
            .map_err(|e| e.relabel("query execution failed", "result parsing failed"))?;

        info!(
            tool = "read_query",
            row_count = rows.len(),
            execution_time_ms = execution_time_ms,
            "Query executed"
        );

        Ok(format::query_results(&rows))
    }
}
