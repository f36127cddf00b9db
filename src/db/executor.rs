//! Query execution engine.
//!
//! SQL is sent verbatim through `sqlx::raw_sql`, so backends run it through
//! their raw (simple) query path and multi-statement payloads execute in
//! full. Only the first result set is returned: rows produced by later
//! statements are drained and discarded. Every call is bounded by the
//! executor's timeout; dropping the returned future (client cancellation)
//! aborts the backend call and releases the connection.
//!
//! # Architecture
//!
//! The executor uses database-specific implementations organized in submodules:
//! - `postgres`: PostgreSQL fetch and execute
//! - `sqlite`: SQLite fetch and execute
//!
//! Each submodule provides identical functionality adapted to its row type.

use crate::config::DEFAULT_QUERY_TIMEOUT_SECS;
use crate::db::materializer::materialize;
use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::ResultRow;
use futures_util::{Stream, TryStreamExt};
use sqlx::Either;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::debug;

/// Query executor that handles database query execution.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    timeout: Duration,
}

impl QueryExecutor {
    /// Create a new query executor with default settings.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS))
    }

    /// Create a new query executor with a custom per-call timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a row-returning statement and materialize its first result set.
    ///
    /// Returns the rows and the execution time in milliseconds.
    pub async fn fetch_rows(&self, pool: &DbPool, sql: &str) -> DbResult<(Vec<ResultRow>, u64)> {
        let start = Instant::now();

        debug!(
            sql = %sql,
            timeout_secs = self.timeout.as_secs(),
            "Executing query"
        );

        let rows = match pool {
            DbPool::Postgres(p) => materialize(&postgres::fetch_rows(p, sql, self.timeout).await?)?,
            DbPool::SQLite(p) => materialize(&sqlite::fetch_rows(p, sql, self.timeout).await?)?,
        };

        Ok((rows, start.elapsed().as_millis() as u64))
    }

    /// Run a statement and return the number of affected rows.
    ///
    /// Returns the affected-row count and the execution time in milliseconds.
    pub async fn execute(&self, pool: &DbPool, sql: &str) -> DbResult<(u64, u64)> {
        let start = Instant::now();

        debug!(
            sql = %sql,
            timeout_secs = self.timeout.as_secs(),
            "Executing statement"
        );

        let rows_affected = match pool {
            DbPool::Postgres(p) => postgres::execute(p, sql, self.timeout).await?,
            DbPool::SQLite(p) => sqlite::execute(p, sql, self.timeout).await?,
        };

        Ok((rows_affected, start.elapsed().as_millis() as u64))
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// Drain a `fetch_many` stream, keeping the rows of the first result set.
///
/// Each statement ends with an `Either::Left` summary, so everything after
/// the first summary belongs to a later statement.
async fn first_result_set<Q, R, S>(mut stream: S) -> Result<Vec<R>, sqlx::Error>
where
    S: Stream<Item = Result<Either<Q, R>, sqlx::Error>> + Unpin,
{
    let mut rows = Vec::new();
    let mut done = false;
    let mut skipped = 0usize;

    while let Some(item) = stream.try_next().await? {
        match item {
            Either::Right(row) if !done => rows.push(row),
            Either::Right(_) => skipped += 1,
            Either::Left(_) => done = true,
        }
    }

    if skipped > 0 {
        debug!(skipped_rows = skipped, "Discarded rows from later result sets");
    }
    Ok(rows)
}

fn timeout_error(operation: &str, timeout: Duration) -> DbError {
    DbError::timeout(operation, timeout)
}

/// Map a failure raised while serving a call. Lost connections are
/// execution failures here; only startup reports `Connection`.
fn backend_error(err: sqlx::Error, acquire_timeout: Duration) -> DbError {
    match err {
        sqlx::Error::PoolTimedOut => DbError::timeout("connection pool acquire", acquire_timeout),
        other => DbError::from(other).into_execution_failure(),
    }
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================
//
// Each module below provides the same interface adapted to its database type.

mod postgres {
    use super::*;
    use sqlx::PgPool;
    use sqlx::postgres::PgRow;

    pub async fn fetch_rows(
        pool: &PgPool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<Vec<PgRow>> {
        let rows_future = first_result_set(sqlx::raw_sql(sql).fetch_many(pool));
        match timeout(query_timeout, rows_future).await {
            Ok(result) => {
                result.map_err(|e| backend_error(e, pool.options().get_acquire_timeout()))
            }
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    pub async fn execute(pool: &PgPool, sql: &str, query_timeout: Duration) -> DbResult<u64> {
        match timeout(query_timeout, sqlx::raw_sql(sql).execute(pool)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(backend_error(e, pool.options().get_acquire_timeout())),
            Err(_) => Err(timeout_error("statement execution", query_timeout)),
        }
    }
}

mod sqlite {
    use super::*;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqliteRow;

    pub async fn fetch_rows(
        pool: &SqlitePool,
        sql: &str,
        query_timeout: Duration,
    ) -> DbResult<Vec<SqliteRow>> {
        let rows_future = first_result_set(sqlx::raw_sql(sql).fetch_many(pool));
        match timeout(query_timeout, rows_future).await {
            Ok(result) => {
                result.map_err(|e| backend_error(e, pool.options().get_acquire_timeout()))
            }
            Err(_) => Err(timeout_error("query execution", query_timeout)),
        }
    }

    pub async fn execute(pool: &SqlitePool, sql: &str, query_timeout: Duration) -> DbResult<u64> {
        match timeout(query_timeout, sqlx::raw_sql(sql).execute(pool)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(backend_error(e, pool.options().get_acquire_timeout())),
            Err(_) => Err(timeout_error("statement execution", query_timeout)),
        }
    }
}
