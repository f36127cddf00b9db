//! Startup configuration tests.

use clap::Parser;
use sql_mcp_server::config::{Config, ServerMode};
use sql_mcp_server::db::ConnectionManager;
use sql_mcp_server::error::DbError;
use std::time::Duration;

fn parse(args: &[&str]) -> Config {
    let mut argv = vec!["sql-mcp-server"];
    argv.extend_from_slice(args);
    Config::try_parse_from(argv).unwrap()
}

#[test]
fn test_non_numeric_port_fails_before_pool() {
    let config = parse(&[
        "--db-host",
        "localhost",
        "--db-port",
        "five-four-three-two",
        "--db-user",
        "postgres",
        "--db-name",
        "app",
    ]);
    let err = config.connection_config().unwrap_err();
    assert!(matches!(err, DbError::Config { .. }));
    assert!(err.to_string().contains("DB_PORT"));
}

#[test]
fn test_database_url_takes_precedence() {
    let config = parse(&[
        "--db-port",
        "nope",
        "--database-url",
        "sqlite::memory:",
    ]);
    let connection = config.connection_config().unwrap();
    assert_eq!(connection.db_type.display_name(), "SQLite");
}

#[test]
fn test_server_modes() {
    assert_eq!(parse(&[]).server_mode, ServerMode::Stdio);
    assert_eq!(
        parse(&["--server-mode", "sse"]).server_mode.http_endpoint(),
        Some("/sse")
    );
    assert_eq!(
        parse(&["--server-mode", "streamableHttp"])
            .server_mode
            .http_endpoint(),
        Some("/mcp")
    );

    let argv = ["sql-mcp-server", "--server-mode", "websocket"];
    assert!(Config::try_parse_from(argv).is_err());
}

#[test]
fn test_http_defaults() {
    let config = parse(&[]);
    assert_eq!(config.http_host, "127.0.0.1");
    assert_eq!(config.http_port, 8088);
    assert_eq!(config.query_timeout_duration(), Duration::from_secs(30));
}

#[tokio::test]
async fn test_unreachable_database_fails_startup() {
    let config = parse(&[
        "--db-host",
        "127.0.0.1",
        "--db-port",
        "1",
        "--db-user",
        "postgres",
        "--db-name",
        "app",
        "--db-sslmode",
        "disable",
        "--connect-timeout",
        "2",
    ]);
    let connection = config.connection_config().unwrap();
    let err = ConnectionManager::initialize(&connection).await.unwrap_err();
    assert!(matches!(
        err,
        DbError::Connection { .. } | DbError::Timeout { .. }
    ));
}
