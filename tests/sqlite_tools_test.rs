//! End-to-end tool tests against a file-backed SQLite database.

use sql_mcp_server::db::ConnectionManager;
use sql_mcp_server::error::DbError;
use sql_mcp_server::models::ConnectionConfig;
use sql_mcp_server::tools::ArgValue;
use sql_mcp_server::tools::explain::{ExplainQueryInput, ExplainToolHandler};
use sql_mcp_server::tools::query::{QueryToolHandler, ReadQueryInput};
use sql_mcp_server::tools::schema::{ListTablesInput, SchemaToolHandler};
use sql_mcp_server::tools::write::{CreateTableInput, WriteQueryInput, WriteToolHandler};
use std::sync::Arc;
use tempfile::NamedTempFile;

struct Harness {
    _file: NamedTempFile,
    manager: Arc<ConnectionManager>,
}

impl Harness {
    async fn new() -> Self {
        let file = NamedTempFile::new().unwrap();
        let url = format!("sqlite:{}?mode=rwc", file.path().to_str().unwrap());
        let config = ConnectionConfig::from_url(url).unwrap();
        let manager = Arc::new(ConnectionManager::initialize(&config).await.unwrap());
        Self {
            _file: file,
            manager,
        }
    }

    fn read(&self) -> QueryToolHandler {
        QueryToolHandler::new(self.manager.clone())
    }

    fn write(&self) -> WriteToolHandler {
        WriteToolHandler::new(self.manager.clone())
    }

    fn schema(&self) -> SchemaToolHandler {
        SchemaToolHandler::new(self.manager.clone())
    }

    fn explain(&self) -> ExplainToolHandler {
        ExplainToolHandler::new(self.manager.clone())
    }

    async fn create(&self, sql: &str) {
        self.write()
            .create_table(CreateTableInput { schema: text(sql) })
            .await
            .unwrap();
    }

    async fn exec(&self, sql: &str) -> String {
        self.write()
            .write_query(WriteQueryInput { query: text(sql) })
            .await
            .unwrap()
    }

    async fn select(&self, sql: &str) -> Result<String, DbError> {
        self.read().read_query(ReadQueryInput { query: text(sql) }).await
    }
}

fn text(s: &str) -> Option<ArgValue> {
    Some(ArgValue::Text(s.to_string()))
}

#[tokio::test]
async fn test_full_tool_flow() {
    let h = Harness::new().await;

    h.create("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
        .await;

    assert_eq!(
        h.exec("INSERT INTO users (id, name) VALUES (1, 'alice'), (2, 'bob')")
            .await,
        "Operation successful. Rows affected: 2"
    );
    assert_eq!(
        h.exec("UPDATE users SET name = 'carol' WHERE id = 2").await,
        "Operation successful. Rows affected: 1"
    );

    assert_eq!(
        h.select("SELECT id, name FROM users ORDER BY id").await.unwrap(),
        "Query results: [{id: 1, name: alice}, {id: 2, name: carol}]"
    );

    assert_eq!(
        h.exec("DELETE FROM users").await,
        "Operation successful. Rows affected: 2"
    );
    assert_eq!(
        h.select("SELECT * FROM users").await.unwrap(),
        "Query results: []"
    );

    let tables = h
        .schema()
        .list_tables(ListTablesInput::default())
        .await
        .unwrap();
    assert_eq!(tables, "Tables: [users]");
}

#[tokio::test]
async fn test_value_decoding() {
    let h = Harness::new().await;
    h.create(
        "CREATE TABLE samples (i INTEGER, r REAL, t TEXT, b BLOB, flag BOOLEAN, missing TEXT)",
    )
    .await;
    h.exec("INSERT INTO samples VALUES (7, 2.5, 'héllo', x'68690a', 1, NULL)")
        .await;

    let out = h.select("SELECT * FROM samples").await.unwrap();
    assert_eq!(
        out,
        "Query results: [{i: 7, r: 2.5, t: héllo, b: hi\n, flag: true, missing: NULL}]"
    );

    // Non-UTF-8 blobs are shown as base64.
    let out = h.select("SELECT x'ff00' AS raw").await.unwrap();
    assert_eq!(out, "Query results: [{raw: /wA=}]");
}

#[tokio::test]
async fn test_duplicate_column_names_are_kept() {
    let h = Harness::new().await;
    let out = h.select("SELECT 1 AS a, 2 AS a").await.unwrap();
    assert_eq!(out, "Query results: [{a: 1, a: 2}]");
}

#[tokio::test]
async fn test_multi_statement_read_returns_first_result_set() {
    let h = Harness::new().await;
    assert_eq!(
        h.select("SELECT 1 AS x; SELECT 'two' AS y").await.unwrap(),
        "Query results: [{x: 1}]"
    );
    assert_eq!(
        h.select("SELECT 1 AS x; SELECT 1 AS a, 2 AS b").await.unwrap(),
        "Query results: [{x: 1}]"
    );
}

#[tokio::test]
async fn test_calls_after_close_are_execution_failures() {
    let h = Harness::new().await;
    h.manager.close().await;

    let err = h.select("SELECT 1").await.unwrap_err();
    assert!(matches!(err, DbError::ExecutionFailed { .. }));
    assert_eq!(err.to_string(), "query execution failed");

    let err = h
        .write()
        .write_query(WriteQueryInput {
            query: text("INSERT INTO t VALUES (1)"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionFailed { .. }));
    assert_eq!(err.to_string(), "write operation failed");

    let err = h
        .schema()
        .list_tables(ListTablesInput::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "failed to list tables");
}

#[tokio::test]
async fn test_classifier_rejections_never_reach_backend() {
    let h = Harness::new().await;
    h.create("CREATE TABLE keep (id INTEGER)").await;
    h.exec("INSERT INTO keep VALUES (1)").await;

    let err = h.select("DROP TABLE keep").await.unwrap_err();
    assert!(matches!(err, DbError::DisallowedStatement { .. }));

    let err = h
        .write()
        .write_query(WriteQueryInput {
            query: text("DROP TABLE keep"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DisallowedStatement { .. }));

    let err = h
        .write()
        .create_table(CreateTableInput {
            schema: text("DROP TABLE keep"),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::DisallowedStatement { .. }));

    assert_eq!(
        h.select("SELECT COUNT(*) AS n FROM keep").await.unwrap(),
        "Query results: [{n: 1}]"
    );
}

#[tokio::test]
async fn test_execution_failure_is_generic() {
    let h = Harness::new().await;
    let err = h.select("SELECT * FROM nonexistent").await.unwrap_err();
    assert!(matches!(err, DbError::ExecutionFailed { .. }));
    assert_eq!(err.to_string(), "query execution failed");
    assert!(err.detail().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn test_explain_query_plan_lines() {
    let h = Harness::new().await;
    h.create("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT)")
        .await;

    let out = h
        .explain()
        .explain_query(ExplainQueryInput {
            schema: text("explain query plan SELECT * FROM items WHERE id = 1"),
        })
        .await
        .unwrap();

    let mut lines = out.lines();
    assert_eq!(lines.next(), Some("Execution plan:"));
    let plan = lines.next().unwrap();
    assert!(plan.contains("items"), "unexpected plan line: {}", plan);
}

#[tokio::test]
async fn test_concurrent_reads_share_pool() {
    let h = Harness::new().await;
    h.create("CREATE TABLE n (v INTEGER)").await;
    h.exec("INSERT INTO n VALUES (1), (2), (3)").await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handler = h.read();
        tasks.push(tokio::spawn(async move {
            handler
                .read_query(ReadQueryInput {
                    query: text("SELECT SUM(v) AS total FROM n"),
                })
                .await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), "Query results: [{total: 6}]");
    }
}
