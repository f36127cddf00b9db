//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Connection pool management
//! - Query execution
//! - Row decoding and materialization
//! - Catalog queries
//! - Database dispatch macros for reducing code duplication

#[macro_use]
pub mod macros;
pub mod catalog;
pub mod executor;
pub mod materializer;
pub mod pool;
pub mod types;

pub use executor::QueryExecutor;
pub use materializer::materialize;
pub use pool::{ConnectionManager, DbPool};
pub use types::RowDecoder;
