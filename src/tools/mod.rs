//! MCP tool implementations.
//!
//! This module contains all database tool handlers:
//! - `read_query`: Execute SELECT queries
//! - `write_query`: Execute INSERT/UPDATE/DELETE statements
//! - `create_table`: Execute CREATE TABLE statements
//! - `list_tables`: List user tables, optionally filtered by schema
//! - `explain_query`: Run a caller-supplied EXPLAIN statement
//!
//! Supporting modules:
//! - `classifier` / `guard`: leading-keyword statement gating
//! - `sanitizer`: quote escaping for the one interpolated filter value
//! - `args`: dynamically typed tool arguments
//! - `format`: response text

pub mod args;
pub mod classifier;
pub mod explain;
pub mod format;
pub mod guard;
pub mod query;
pub mod sanitizer;
pub mod schema;
pub mod write;

pub use args::ArgValue;
pub use classifier::StatementCategory;
pub use explain::{ExplainQueryInput, ExplainToolHandler};
pub use query::{QueryToolHandler, ReadQueryInput};
pub use schema::{ListTablesInput, SchemaToolHandler};
pub use write::{CreateTableInput, WriteQueryInput, WriteToolHandler};
