//! Connection pool management.
//!
//! The server talks to exactly one database through one pool, created once
//! at startup and closed at shutdown. Backend-specific pools (PgPool,
//! SqlitePool) are used instead of `AnyPool` to keep full type support.

use crate::config::{
    MAX_CONNECTION_LIFETIME, MAX_IDLE_TIME, MAX_OPEN_CONNECTIONS, MAX_OPEN_CONNECTIONS_SQLITE,
};
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionConfig, ConnectionTarget, DatabaseType, PostgresParams};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Connection, PgPool, SqlitePool};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    SQLite(SqlitePool),
}

impl DbPool {
    /// Close the connection pool.
    pub async fn close(&self) {
        match self {
            DbPool::Postgres(pool) => pool.close().await,
            DbPool::SQLite(pool) => pool.close().await,
        }
    }

    /// Get the database type for this pool.
    pub fn db_type(&self) -> DatabaseType {
        match self {
            DbPool::Postgres(_) => DatabaseType::PostgreSQL,
            DbPool::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

/// Owner of the process-wide pool. Handlers receive it through an `Arc`.
#[derive(Debug, Clone)]
pub struct ConnectionManager {
    pool: DbPool,
}

impl ConnectionManager {
    /// Open the pool and verify the database is reachable.
    ///
    /// Returns a `Connection` error if the liveness probe fails; the pool is
    /// closed before returning in that case.
    pub async fn initialize(config: &ConnectionConfig) -> DbResult<Self> {
        info!(
            db_type = %config.db_type,
            target = %config.redacted(),
            "Connecting to database"
        );

        let manager = Self {
            pool: Self::create_pool(config)?,
        };

        if let Err(e) = manager.ping(config.acquire_timeout).await {
            manager.close().await;
            return Err(e);
        }

        info!(db_type = %config.db_type, "Connected successfully");
        Ok(manager)
    }

    /// Wrap an existing pool (tests, embedding).
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn db_type(&self) -> DatabaseType {
        self.pool.db_type()
    }

    /// Acquire a connection and ping it, bounded by `timeout`.
    pub async fn ping(&self, timeout: Duration) -> DbResult<()> {
        let probe = async {
            impl_db_dispatch!(&self.pool, {
                Postgres(p) => p.acquire().await?.ping().await,
                SQLite(p) => p.acquire().await?.ping().await,
            })
        };

        match tokio::time::timeout(timeout, probe).await {
            Ok(Ok(())) => {
                debug!("Database ping succeeded");
                Ok(())
            }
            Ok(Err(e)) => Err(DbError::connection("database ping failed", e.to_string())),
            Err(_) => Err(DbError::connection(
                "database ping failed",
                format!("no response within {}s", timeout.as_secs()),
            )),
        }
    }

    /// Close the pool. In-flight calls finish; new acquires fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Connection pool closed");
    }

    /// Build the pool without connecting; connections open on first use.
    fn create_pool(config: &ConnectionConfig) -> DbResult<DbPool> {
        match (&config.target, config.db_type) {
            (ConnectionTarget::Params(params), _) => {
                let options = Self::postgres_options(params)?;
                Ok(DbPool::Postgres(
                    Self::postgres_pool_options(config).connect_lazy_with(options),
                ))
            }
            (ConnectionTarget::Url(url), DatabaseType::PostgreSQL) => {
                let options = PgConnectOptions::from_str(url).map_err(|e| {
                    DbError::config(format!("Invalid PostgreSQL connection string: {}", e))
                })?;
                Ok(DbPool::Postgres(
                    Self::postgres_pool_options(config).connect_lazy_with(options),
                ))
            }
            (ConnectionTarget::Url(url), DatabaseType::SQLite) => {
                let options = SqliteConnectOptions::from_str(url).map_err(|e| {
                    DbError::config(format!("Invalid SQLite connection string: {}", e))
                })?;
                let pool = Self::sqlite_pool_options(config, is_in_memory_sqlite(url))
                    .connect_lazy_with(options);
                Ok(DbPool::SQLite(pool))
            }
        }
    }

    fn postgres_pool_options(config: &ConnectionConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(MAX_OPEN_CONNECTIONS)
            .max_lifetime(MAX_CONNECTION_LIFETIME)
            .idle_timeout(MAX_IDLE_TIME)
            .acquire_timeout(config.acquire_timeout)
    }

    /// An in-memory database lives only as long as its connection, so that
    /// connection is kept open for the life of the pool.
    fn sqlite_pool_options(config: &ConnectionConfig, in_memory: bool) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(MAX_OPEN_CONNECTIONS_SQLITE)
            .acquire_timeout(config.acquire_timeout);

        if in_memory {
            options
                .min_connections(1)
                .max_lifetime(None)
                .idle_timeout(None)
        } else {
            options
                .max_lifetime(MAX_CONNECTION_LIFETIME)
                .idle_timeout(MAX_IDLE_TIME)
        }
    }

    fn postgres_options(params: &PostgresParams) -> DbResult<PgConnectOptions> {
        let mut options = PgConnectOptions::new().port(params.port);
        if !params.host.is_empty() {
            options = options.host(&params.host);
        }
        if !params.user.is_empty() {
            options = options.username(&params.user);
        }
        if !params.password.is_empty() {
            options = options.password(&params.password);
        }
        if !params.database.is_empty() {
            options = options.database(&params.database);
        }
        if let Some(mode) = &params.ssl_mode {
            let mode = PgSslMode::from_str(mode)
                .map_err(|e| DbError::config(format!("invalid DB_SSLMODE: {}", e)))?;
            options = options.ssl_mode(mode);
        }
        Ok(options)
    }
}

/// Whether a SQLite URL names a purely in-memory database
/// (`sqlite::memory:` or `mode=memory`).
fn is_in_memory_sqlite(url: &str) -> bool {
    let rest = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let (database, params) = match rest.split_once('?') {
        Some((database, params)) => (database, Some(params)),
        None => (rest, None),
    };

    database == ":memory:"
        || params.is_some_and(|params| {
            url::form_urlencoded::parse(params.as_bytes())
                .any(|(key, value)| key == "mode" && value == "memory")
        })
}
