//! Configuration handling for the SQL MCP Server.
//!
//! Settings come from CLI flags or environment variables (a `.env` file is
//! loaded into the environment by `main` before parsing).

use crate::error::{DbError, DbResult};
use crate::models::ConnectionConfig;
use clap::Parser;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8088;
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

// Fixed pool policy
pub const MAX_OPEN_CONNECTIONS: u32 = 25;
pub const MAX_OPEN_CONNECTIONS_SQLITE: u32 = 1;
pub const MAX_CONNECTION_LIFETIME: Duration = Duration::from_secs(5 * 60);
pub const MAX_IDLE_TIME: Duration = Duration::from_secs(2 * 60);

/// How the MCP server is exposed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP listener at `/sse`
    Sse,
    /// HTTP listener at `/mcp`
    StreamableHttp,
}

impl ServerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Sse => "sse",
            Self::StreamableHttp => "streamableHttp",
        }
    }

    /// HTTP path the MCP service is mounted at, if this mode serves HTTP.
    pub fn http_endpoint(&self) -> Option<&'static str> {
        match self {
            Self::Stdio => None,
            Self::Sse => Some("/sse"),
            Self::StreamableHttp => Some("/mcp"),
        }
    }
}

impl FromStr for ServerMode {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "sse" => Ok(Self::Sse),
            "streamableHttp" => Ok(Self::StreamableHttp),
            other => Err(DbError::config(format!(
                "unsupported server mode '{}' (expected stdio, sse or streamableHttp)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the SQL MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sql-mcp-server",
    about = "MCP server exposing a PostgreSQL database to AI assistants",
    version,
    author
)]
pub struct Config {
    /// Database host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port. Kept as text so a bad value is reported as a
    /// configuration error instead of a usage error.
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<String>,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password (never logged)
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// SSL mode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, env = "DB_SSLMODE")]
    pub db_sslmode: Option<String>,

    /// Full connection URL (postgres:// or sqlite:). Overrides the DB_* fields.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Server mode (stdio, sse or streamableHttp)
    #[arg(long, default_value = "stdio", env = "SERVER_MODE")]
    pub server_mode: ServerMode,

    /// HTTP host to bind to (sse / streamableHttp only)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (sse / streamableHttp only)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "HTTP_PORT")]
    pub http_port: u16,

    /// Per-call query timeout in seconds
    #[arg(long, default_value_t = DEFAULT_QUERY_TIMEOUT_SECS, env = "QUERY_TIMEOUT")]
    pub query_timeout: u64,

    /// Connection acquire timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, env = "CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            db_host: None,
            db_port: None,
            db_user: None,
            db_password: None,
            db_name: None,
            db_sslmode: None,
            database_url: None,
            server_mode: ServerMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Build the validated connection configuration.
    ///
    /// `DATABASE_URL` wins when set; otherwise the discrete `DB_*` fields
    /// are used and `DB_PORT` must be an integer.
    pub fn connection_config(&self) -> DbResult<ConnectionConfig> {
        let config = match self.database_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => ConnectionConfig::from_url(url.trim())?,
            None => ConnectionConfig::from_parts(
                self.db_host.as_deref(),
                self.db_port.as_deref(),
                self.db_user.as_deref(),
                self.db_password.as_deref(),
                self.db_name.as_deref(),
                self.db_sslmode.as_deref(),
            )?,
        };
        Ok(config.with_acquire_timeout(self.connect_timeout_duration()))
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConnectionTarget, DatabaseType};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_mode, ServerMode::Stdio);
        assert_eq!(config.http_host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http_port, 8088);
    }

    #[test]
    fn test_timeout_durations() {
        let config = Config {
            query_timeout: 60,
            connect_timeout: 15,
            ..Config::default()
        };
        assert_eq!(config.query_timeout_duration(), Duration::from_secs(60));
        assert_eq!(config.connect_timeout_duration(), Duration::from_secs(15));
    }

    #[test]
    fn test_server_mode_from_str() {
        assert_eq!("stdio".parse::<ServerMode>().unwrap(), ServerMode::Stdio);
        assert_eq!("sse".parse::<ServerMode>().unwrap(), ServerMode::Sse);
        assert_eq!(
            "streamableHttp".parse::<ServerMode>().unwrap(),
            ServerMode::StreamableHttp
        );
        assert!(matches!(
            "websocket".parse::<ServerMode>(),
            Err(DbError::Config { .. })
        ));
        assert!("STDIO".parse::<ServerMode>().is_err());
    }

    #[test]
    fn test_server_mode_endpoints() {
        assert_eq!(ServerMode::Stdio.http_endpoint(), None);
        assert_eq!(ServerMode::Sse.http_endpoint(), Some("/sse"));
        assert_eq!(ServerMode::StreamableHttp.http_endpoint(), Some("/mcp"));
        assert_eq!(ServerMode::StreamableHttp.to_string(), "streamableHttp");
    }

    #[test]
    fn test_parse_server_mode_flag() {
        let config =
            Config::try_parse_from(["sql-mcp-server", "--server-mode", "streamableHttp"]).unwrap();
        assert_eq!(config.server_mode, ServerMode::StreamableHttp);

        let result = Config::try_parse_from(["sql-mcp-server", "--server-mode", "grpc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_numeric_port_is_config_error() {
        let config = Config {
            db_host: Some("localhost".to_string()),
            db_port: Some("postgres".to_string()),
            ..Config::default()
        };
        let err = config.connection_config().unwrap_err();
        assert!(matches!(err, DbError::Config { .. }));
        assert!(err.to_string().contains("DB_PORT"));
    }

    #[test]
    fn test_connection_config_from_fields() {
        let config = Config {
            db_host: Some("localhost".to_string()),
            db_port: Some("5433".to_string()),
            db_user: Some("postgres".to_string()),
            db_name: Some("app".to_string()),
            connect_timeout: 3,
            ..Config::default()
        };
        let conn = config.connection_config().unwrap();
        assert_eq!(conn.db_type, DatabaseType::PostgreSQL);
        assert_eq!(conn.acquire_timeout, Duration::from_secs(3));
        let ConnectionTarget::Params(params) = conn.target else {
            panic!("expected discrete params");
        };
        assert_eq!(params.port, 5433);
    }

    #[test]
    fn test_database_url_overrides_fields() {
        let config = Config {
            db_port: Some("not-a-port".to_string()),
            database_url: Some("sqlite::memory:".to_string()),
            ..Config::default()
        };
        let conn = config.connection_config().unwrap();
        assert_eq!(conn.db_type, DatabaseType::SQLite);
    }

    #[test]
    fn test_pool_policy_constants() {
        assert_eq!(MAX_OPEN_CONNECTIONS, 25);
        assert_eq!(MAX_OPEN_CONNECTIONS_SQLITE, 1);
        assert_eq!(MAX_CONNECTION_LIFETIME, Duration::from_secs(300));
        assert_eq!(MAX_IDLE_TIME, Duration::from_secs(120));
    }
}
