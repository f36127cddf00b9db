//! MCP service implementation using rmcp.
//!
//! This module defines the SqlService struct with the five database tools
//! exposed via the MCP protocol using the rmcp framework's macros. Every
//! successful call answers with a single text block.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::DbResult;
use crate::tools::explain::{ExplainQueryInput, ExplainToolHandler};
use crate::tools::query::{QueryToolHandler, ReadQueryInput};
use crate::tools::schema::{ListTablesInput, SchemaToolHandler};
use crate::tools::write::{CreateTableInput, WriteQueryInput, WriteToolHandler};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use std::sync::Arc;
use tracing::{debug, error};

pub const SERVER_NAME: &str = "sql-mcp-server";

#[derive(Clone)]
pub struct SqlService {
    /// Shared connection manager for all database operations
    connection_manager: Arc<ConnectionManager>,
    /// Executor settings (per-call timeout) shared by every handler
    executor: QueryExecutor,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl SqlService {
    /// Create a new SqlService with the default executor.
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self::with_executor(connection_manager, QueryExecutor::new())
    }

    /// Create a new SqlService whose handlers use `executor`.
    pub fn with_executor(connection_manager: Arc<ConnectionManager>, executor: QueryExecutor) -> Self {
        Self {
            connection_manager,
            executor,
            tool_router: Self::tool_router(),
        }
    }

    /// Turn a handler outcome into a tool response, logging failures.
    ///
    /// Caller mistakes are logged at debug. Server-side failures are logged
    /// at error together with the backend detail, which never reaches the
    /// client.
    fn respond(tool: &'static str, outcome: DbResult<String>) -> Result<CallToolResult, McpError> {
        match outcome {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) => {
                if err.is_caller_error() {
                    debug!(tool, error = %err, "Tool call rejected");
                } else {
                    error!(
                        tool,
                        error = %err,
                        detail = err.detail().unwrap_or(""),
                        "Tool call failed"
                    );
                }
                Err(McpError::from(err))
            }
        }
    }
}

#[tool_router]
impl SqlService {
    #[tool(description = "Execute a SELECT query on the postgres database")]
    async fn read_query(
        &self,
        Parameters(input): Parameters<ReadQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler =
            QueryToolHandler::with_executor(self.connection_manager.clone(), self.executor.clone());
        Self::respond("read_query", handler.read_query(input).await)
    }

    #[tool(description = "Execute an INSERT, UPDATE, or DELETE query on the postgres database")]
    async fn write_query(
        &self,
        Parameters(input): Parameters<WriteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler =
            WriteToolHandler::with_executor(self.connection_manager.clone(), self.executor.clone());
        Self::respond("write_query", handler.write_query(input).await)
    }

    #[tool(description = "Create a new table in the postgres database")]
    async fn create_table(
        &self,
        Parameters(input): Parameters<CreateTableInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler =
            WriteToolHandler::with_executor(self.connection_manager.clone(), self.executor.clone());
        Self::respond("create_table", handler.create_table(input).await)
    }

    #[tool(description = "List all user tables in the database")]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler =
            SchemaToolHandler::with_executor(self.connection_manager.clone(), self.executor.clone());
        Self::respond("list_tables", handler.list_tables(input).await)
    }

    #[tool(description = "Explain a query execution plan on the postgres database")]
    async fn explain_query(
        &self,
        Parameters(input): Parameters<ExplainQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler =
            ExplainToolHandler::with_executor(self.connection_manager.clone(), self.executor.clone());
        Self::respond("explain_query", handler.explain_query(input).await)
    }
}

#[tool_handler]
impl ServerHandler for SqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("SQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "SQL database tools.\n\
                \n\
                - `read_query`: run a SELECT statement\n\
                - `write_query`: run an INSERT, UPDATE or DELETE statement\n\
                - `create_table`: run a CREATE TABLE statement\n\
                - `list_tables`: list user tables, optionally filtered by `schema`\n\
                - `explain_query`: run a statement starting with EXPLAIN\n\
                \n\
                Each tool checks only the leading keyword of the statement."
                    .to_string(),
            ),
        }
    }
}
