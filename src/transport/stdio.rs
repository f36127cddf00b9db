//! Stdio transport for the MCP server.
//!
//! Logs go to stderr so stdout carries only protocol frames.

use crate::db::{ConnectionManager, QueryExecutor};
use crate::error::{DbError, DbResult};
use crate::mcp::SqlService;
use crate::transport::{Transport, wait_for_signal};
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::info;

/// Serves one MCP session over stdin/stdout until the client hangs up or
/// the process is signalled.
pub struct StdioTransport {
    connection_manager: Arc<ConnectionManager>,
    executor: QueryExecutor,
}

impl StdioTransport {
    pub fn new(connection_manager: Arc<ConnectionManager>, executor: QueryExecutor) -> Self {
        Self {
            connection_manager,
            executor,
        }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Serving MCP over stdio");

        let session = SqlService::with_executor(self.connection_manager.clone(), self.executor.clone())
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("stdio session setup failed: {}", e)))?;

        let ended = tokio::select! {
            result = session.waiting() => Some(result),
            _ = wait_for_signal() => None,
        };

        self.connection_manager.close().await;

        match ended {
            Some(Ok(reason)) => {
                info!(?reason, "Stdio session ended");
                Ok(())
            }
            Some(Err(e)) => Err(DbError::internal(format!("stdio session failed: {}", e))),
            // stdin is read on a blocking thread the runtime would wait on forever.
            None => std::process::exit(0),
        }
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}
