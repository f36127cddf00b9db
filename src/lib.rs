//! SQL MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to run gated SQL against a PostgreSQL database (SQLite is supported for
//! local use and tests). Five tools are exposed: `read_query`, `write_query`,
//! `create_table`, `list_tables` and `explain_query`.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, DbResult};
pub use mcp::SqlService;
