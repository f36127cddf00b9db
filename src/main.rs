//! SQL MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to query and modify a PostgreSQL database.

use clap::Parser;
use sql_mcp_server::config::{Config, ServerMode};
use sql_mcp_server::db::{ConnectionManager, QueryExecutor};
use sql_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr; in stdio mode stdout belongs to the protocol.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; a malformed one is not.
    if let Err(e) = dotenv::dotenv() {
        if !e.not_found() {
            eprintln!("Error: failed to load .env file: {}", e);
            return Err(e.into());
        }
    }

    let config = Config::parse();

    init_tracing(&config);

    info!(
        server_mode = %config.server_mode,
        "Starting SQL MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let connection_config = match config.connection_config() {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Invalid database configuration");
            return Err(e.into());
        }
    };

    let connection_manager = match ConnectionManager::initialize(&connection_config).await {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            error!(
                error = %e,
                detail = e.detail().unwrap_or(""),
                "Failed to connect to database"
            );
            return Err(e.into());
        }
    };
    info!(db_type = %connection_manager.db_type(), "Database connection established");

    let executor = QueryExecutor::with_timeout(config.query_timeout_duration());

    let result = match config.server_mode.http_endpoint() {
        None => {
            let transport = StdioTransport::new(connection_manager, executor);
            transport.run().await
        }
        Some(endpoint) => {
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = endpoint,
                sse = config.server_mode == ServerMode::Sse,
                "Using HTTP transport"
            );
            let transport = HttpTransport::new(
                connection_manager,
                executor,
                &config.http_host,
                config.http_port,
                endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
