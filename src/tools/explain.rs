//! Query execution plan tools.
//!
//! This module implements the `explain_query` MCP tool. The caller supplies
//! the whole EXPLAIN statement, so backend-specific forms (`EXPLAIN ANALYZE`,
//! `EXPLAIN QUERY PLAN`) pass through unchanged. Note that `EXPLAIN ANALYZE`
//! runs the explained statement.

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

/// Input for the explain_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExplainQueryInput {
    /// SQL query to explain,start with EXPLAIN
    #[schemars(with = "String")]
    pub schema: Option<ArgValue>,
}

/// Handler for the explain_query tool.
pub struct ExplainToolHandler {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl ExplainToolHandler {
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

    pub async fn explain_query(&self, input: ExplainQueryInput) -> DbResult<String> {
        let statement = require_string(input.schema, "invalid schema parameter")?;
        ensure_category(
            "explain_query",
            &statement,
            StatementCategory::Explain,
            self.connection_manager.db_type(),
        )?;

        let (rows, execution_time_ms) = self
            .executor
            .fetch_rows(self.connection_manager.pool(), &statement)
            .await
            .map_err(|e| e.relabel("explain execution failed", "error scanning explain result"))?;

        let lines = rows.iter().map(format::plan_line).collect::<Vec<_>>();

        info!(
            tool = "explain_query",
            plan_lines = lines.len(),
            execution_time_ms = execution_time_ms,
            "Explain executed"
        );

        Ok(format::execution_plan(&lines))
    }
}
