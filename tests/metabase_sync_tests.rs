//! Metabase sync against a mocked Metabase API
//!
//! `dbt-metabase` is replaced by an executor that records what it was asked
//! to run.

use async_trait::async_trait;
use bgcflow_wrapper::external::{CommandError, CommandExecutor, CommandOutput, Invocation};
use bgcflow_wrapper::metabase::{MetabaseClient, MetabaseSync, SyncOptions, UploadOutcome};
use serde_json::json;
use std::sync::Mutex;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct FakeDbtMetabase {
    calls: Mutex<Vec<Invocation>>,
}

#[async_trait]
impl CommandExecutor for FakeDbtMetabase {
    async fn execute(&self, invocation: &Invocation) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(CommandOutput {
            status_code: 0,
            stdout: "Synced models".to_string(),
            stderr: String::new(),
        })
    }

    async fn run(&self, invocation: &Invocation) -> Result<i32, CommandError> {
        self.calls.lock().unwrap().push(invocation.clone());
        Ok(0)
    }
}

fn dbt_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("dbt_bgcflow.duckdb"), b"").unwrap();
    dir
}

fn options(host: &str, dbt_dir: &TempDir) -> SyncOptions {
    SyncOptions {
        project: "mq_saccharopolyspora".to_string(),
        bgcflow_dir: dbt_dir.path().to_path_buf(),
        dbt_dir: Some(dbt_dir.path().to_path_buf()),
        host: host.to_string(),
        username: "admin@example.org".to_string(),
        password: "secret".to_string(),
        dbt_schema: "main".to_string(),
        dbt_database: "dbt_bgcflow".to_string(),
        http: true,
        metabase_database: None,
        dbt_excludes: vec!["checkm".to_string()],
    }
}

async fn metabase_with_databases(databases: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/session"))
        .and(body_partial_json(json!({"username": "admin@example.org"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "session-1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/database"))
        .and(header("X-Metabase-Session", "session-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": databases})))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_new_database_is_created_then_models_synced() {
    let server = metabase_with_databases(json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/database"))
        .and(body_partial_json(json!({"engine": "duckdb", "name": "mq_saccharopolyspora"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let dbt = dbt_project();
    let executor = FakeDbtMetabase::default();
    let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
    let never_asked = |_: &str| -> std::io::Result<bool> { panic!("no existing database to confirm") };

    let outcome = sync.run(&options(&server.uri(), &dbt), &never_asked).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Created);
    let calls = executor.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let args = &calls[0].args;
    assert_eq!(args[0], "models");
    assert!(args.contains(&"--metabase_http".to_string()));
    let excludes = args.iter().position(|a| a == "--dbt_excludes").unwrap();
    assert_eq!(args[excludes + 1], "checkm");
}

#[tokio::test]
async fn test_declined_update_skips_model_sync() {
    let server =
        metabase_with_databases(json!([{"id": 3, "name": "mq_saccharopolyspora"}])).await;
    Mock::given(method("PUT"))
        .and(path("/api/database/3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dbt = dbt_project();
    let executor = FakeDbtMetabase::default();
    let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
    let decline = |_: &str| -> std::io::Result<bool> { Ok(false) };

    let outcome = sync.run(&options(&server.uri(), &dbt), &decline).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Cancelled);
    assert!(executor.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_confirmed_update_replaces_existing_database() {
    let server =
        metabase_with_databases(json!([{"id": 3, "name": "mq_saccharopolyspora"}])).await;
    Mock::given(method("PUT"))
        .and(path("/api/database/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let dbt = dbt_project();
    let executor = FakeDbtMetabase::default();
    let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
    let accept = |_: &str| -> std::io::Result<bool> { Ok(true) };

    let outcome = sync.run(&options(&server.uri(), &dbt), &accept).await.unwrap();

    assert_eq!(outcome, UploadOutcome::Updated);
    assert_eq!(executor.calls.lock().unwrap().len(), 1);
}
