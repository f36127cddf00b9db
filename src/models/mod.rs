//! Data models for the SQL MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod connection;
pub mod value;

// Re-export commonly used types
pub use connection::{
    ConnectionConfig, ConnectionConfigError, ConnectionTarget, DatabaseType, PostgresParams,
};
pub use value::{CellValue, ResultRow};
