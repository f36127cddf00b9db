//! Connection-related data models.
//!
//! This module defines the validated description of the database the server
//! talks to. Nothing here opens a connection; see [`crate::db::pool`].

use std::time::Duration;
use url::Url;

/// SSL modes accepted by the PostgreSQL driver.
pub const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// Supported database types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    PostgreSQL,
    SQLite,
}

impl DatabaseType {
    /// Parse database type from a connection string.
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let lower = connection_string.to_lowercase();
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::PostgreSQL)
        } else if lower.starts_with("sqlite:") {
            Some(Self::SQLite)
        } else {
            None
        }
    }

    /// Get the display name for this database type.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::SQLite => "SQLite",
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Discrete PostgreSQL connection fields, as read from `DB_*` settings.
///
/// Empty fields are left to the driver's defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Contains sensitive data - never log
    pub password: String,
    pub database: String,
    /// `None` keeps the driver default (`prefer`).
    pub ssl_mode: Option<String>,
}

/// Where the pool should connect to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    Params(PostgresParams),
    /// Full connection URL (sensitive - not logged).
    Url(String),
}

/// Validated configuration for the single database connection pool.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub db_type: DatabaseType,
    pub target: ConnectionTarget,
    /// Bound on pool acquire and the startup liveness probe.
    pub acquire_timeout: Duration,
}

impl ConnectionConfig {
    /// Default acquire timeout when none is configured.
    pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

    /// Build a PostgreSQL configuration from discrete fields.
    ///
    /// The port is mandatory and must parse as an integer; this is checked
    /// here so a bad value fails before any pool is created.
    pub fn from_parts(
        host: Option<&str>,
        port: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
        database: Option<&str>,
        ssl_mode: Option<&str>,
    ) -> Result<Self, ConnectionConfigError> {
        let port = match port.map(str::trim) {
            None | Some("") => return Err(ConnectionConfigError::MissingPort),
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConnectionConfigError::InvalidPort(raw.to_string()))?,
        };

        let ssl_mode = match ssl_mode.map(str::trim) {
            None | Some("") => None,
            Some(mode) => {
                let lower = mode.to_ascii_lowercase();
                if !SSL_MODES.contains(&lower.as_str()) {
                    return Err(ConnectionConfigError::InvalidSslMode(mode.to_string()));
                }
                Some(lower)
            }
        };

        let field = |v: Option<&str>| v.unwrap_or_default().to_string();

        Ok(Self {
            db_type: DatabaseType::PostgreSQL,
            target: ConnectionTarget::Params(PostgresParams {
                host: field(host),
                port,
                user: field(user),
                password: field(password),
                database: field(database),
                ssl_mode,
            }),
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
        })
    }

    /// Build a configuration from a full connection URL.
    pub fn from_url(url: impl Into<String>) -> Result<Self, ConnectionConfigError> {
        let url = url.into();
        let db_type = DatabaseType::from_connection_string(&url)
            .ok_or_else(|| ConnectionConfigError::UnknownDatabaseType(scheme_of(&url)))?;

        Ok(Self {
            db_type,
            target: ConnectionTarget::Url(url),
            acquire_timeout: Self::DEFAULT_ACQUIRE_TIMEOUT,
        })
    }

    /// Override the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Get a display-safe description of the target (credentials masked).
    pub fn redacted(&self) -> String {
        match &self.target {
            ConnectionTarget::Params(p) => {
                let host = if p.host.is_empty() { "localhost" } else { &p.host };
                let mut url = format!("postgres://{}@{}:{}", p.user, host, p.port);
                if !p.password.is_empty() {
                    url = format!("postgres://{}:****@{}:{}", p.user, host, p.port);
                }
                if !p.database.is_empty() {
                    url.push('/');
                    url.push_str(&p.database);
                }
                url
            }
            ConnectionTarget::Url(raw) => match Url::parse(raw) {
                Ok(mut url) => {
                    if url.password().is_some() {
                        // set_password only fails for cannot-be-a-base URLs, which carry no password.
                        let _ = url.set_password(Some("****"));
                    }
                    url.to_string()
                }
                Err(_) => format!("{}:<unparsable>", scheme_of(raw)),
            },
        }
    }
}

fn scheme_of(url: &str) -> String {
    url.split(':').next().unwrap_or_default().to_string()
}

/// Errors that can occur when creating a connection configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConnectionConfigError {
    #[error("DB_PORT is required")]
    MissingPort,

    #[error("DB_PORT must be an integer, got '{0}'")]
    InvalidPort(String),

    #[error("unsupported DB_SSLMODE '{0}'")]
    InvalidSslMode(String),

    /// Could not determine database type from connection string
    #[error("Unknown database type in connection string: {0}")]
    UnknownDatabaseType(String),
}

impl From<ConnectionConfigError> for crate::error::DbError {
    fn from(err: ConnectionConfigError) -> Self {
        crate::error::DbError::config(err.to_string())
    }
}
