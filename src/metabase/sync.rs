use super::client::{DatabaseRequest, MetabaseClient};
use super::MetabaseError;
use crate::external::{CommandExecutor, CommandOutput, Invocation};
use crate::report::metadata::{antismash_version, ProjectMetadata, PROJECT_METADATA};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DUCKDB_FILE: &str = "dbt_bgcflow.duckdb";

/// dbt models produced from each pipeline's output
pub const DBT_MODELS: &[(&str, &[&str])] = &[
    ("query-bigslice", &["bigfam_hits", "bigfam_network"]),
    ("bigscape", &["bigscape_cluster", "bigscape_network", "mibig_hits"]),
    ("checkm", &["checkm"]),
    ("seqfu", &["seqfu"]),
    ("antismash", &["genomes"]),
];

/// `extra` followed by the models of every pipeline the project did not run.
pub fn excluded_models(metadata: &ProjectMetadata, extra: &[String]) -> Vec<String> {
    let mut excludes = extra.to_vec();
    for (pipeline, models) in DBT_MODELS {
        if !metadata.uses_rule(pipeline) {
            excludes.extend(models.iter().map(|m| m.to_string()));
        }
    }
    excludes
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub project: String,
    pub bgcflow_dir: PathBuf,
    pub dbt_dir: Option<PathBuf>,
    pub host: String,
    pub username: String,
    pub password: String,
    pub dbt_schema: String,
    pub dbt_database: String,
    /// `--metabase_http` rather than `--metabase_https`
    pub http: bool,
    pub metabase_database: Option<String>,
    pub dbt_excludes: Vec<String>,
}

impl SyncOptions {
    pub fn metabase_database(&self) -> &str {
        self.metabase_database.as_deref().unwrap_or(&self.project)
    }
}

/// The dbt project to upload and the models to leave out of the sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbtTarget {
    pub dir: PathBuf,
    pub excludes: Vec<String>,
}

impl DbtTarget {
    /// Derive the dbt directory from the project's results unless one was given.
    pub fn resolve(options: &SyncOptions) -> Result<Self, MetabaseError> {
        if let Some(dir) = &options.dbt_dir {
            println!(" - Accessing dbt project directory in: {}", dir.display());
            println!(" - Using all models for sync");
            return Ok(Self {
                dir: dir.clone(),
                excludes: options.dbt_excludes.clone(),
            });
        }

        let report_dir = crate::results::processed_dir(&options.bgcflow_dir, &options.project);
        println!(" - Accessing BGCFlow report directory in: {}", report_dir.display());
        let version = antismash_version(&report_dir)?;
        println!(" - AntiSMASH version: {version}");

        let metadata_path = report_dir.join(PROJECT_METADATA);
        println!(" - Reading project metadata from: {}", metadata_path.display());
        let metadata = ProjectMetadata::load(&metadata_path)?;
        println!(
            " - Used pipelines: {}",
            metadata.rule_names().collect::<Vec<_>>().join(", ")
        );

        let excludes = excluded_models(&metadata, &options.dbt_excludes);
        println!(" - Excluding models for sync: {}", excludes.join(", "));
        Ok(Self {
            dir: report_dir.join("dbt").join(format!("antiSMASH_{version}")),
            excludes,
        })
    }

    pub fn duckdb_path(&self) -> PathBuf {
        self.dir.join(DUCKDB_FILE)
    }

    /// Absolute path of the DuckDB file, which must exist.
    pub fn database_file(&self) -> Result<PathBuf, MetabaseError> {
        let duckdb = self.duckdb_path();
        if !duckdb.is_file() {
            return Err(MetabaseError::MissingDatabaseFile(duckdb));
        }
        absolute(&duckdb)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Created,
    Updated,
    Cancelled,
}

/// Host as `dbt-metabase` expects it, without the scheme.
pub fn bare_host(host: &str) -> &str {
    host.rsplit("://").next().unwrap_or(host)
}

pub fn models_invocation(program: &str, options: &SyncOptions, target: &DbtTarget) -> Invocation {
    let mut invocation = Invocation::new(program)
        .arg("models")
        .arg("--dbt_path")
        .arg(target.dir.to_string_lossy())
        .arg("--dbt_database")
        .arg(options.dbt_database.clone())
        .arg("--metabase_host")
        .arg(bare_host(&options.host))
        .arg("--metabase_user")
        .arg(options.username.clone())
        .arg("--metabase_password")
        .arg(options.password.clone())
        .arg("--metabase_database")
        .arg(options.metabase_database())
        .arg("--dbt_schema")
        .arg(options.dbt_schema.clone())
        .arg(if options.http {
            "--metabase_http"
        } else {
            "--metabase_https"
        });
    if !target.excludes.is_empty() {
        invocation = invocation.arg("--dbt_excludes").args(target.excludes.iter().cloned());
    }
    invocation
}

/// Drives the upload against Metabase and the follow-up `dbt-metabase` run
pub struct MetabaseSync<'a> {
    client: MetabaseClient,
    executor: &'a dyn CommandExecutor,
    dbt_metabase: String,
}

impl<'a> MetabaseSync<'a> {
    pub fn new(
        client: MetabaseClient,
        executor: &'a dyn CommandExecutor,
        dbt_metabase: impl Into<String>,
    ) -> Self {
        Self {
            client,
            executor,
            dbt_metabase: dbt_metabase.into(),
        }
    }

    /// Register the DuckDB file under the project name, creating or updating it.
    ///
    /// `confirm` is asked before an existing database is replaced.
    pub async fn upload(
        &self,
        options: &SyncOptions,
        target: &DbtTarget,
        confirm: &(dyn Fn(&str) -> std::io::Result<bool> + Sync),
    ) -> Result<UploadOutcome, MetabaseError> {
        let duckdb = target.database_file()?;

        let session = self.client.login(&options.username, &options.password).await?;
        let existing = self.client.find_database(&session, &options.project).await?;
        let request = DatabaseRequest::duckdb(&options.project, &duckdb.to_string_lossy());

        match existing {
            Some(database) => {
                let question = format!(
                    " - WARNING: A database with the name '{}' already exists in Metabase. Do you want to continue with the upload?",
                    options.project
                );
                if !confirm(&question).map_err(|source| MetabaseError::Io {
                    path: duckdb.clone(),
                    source,
                })? {
                    println!(" - Database upload cancelled by user");
                    return Ok(UploadOutcome::Cancelled);
                }
                self.client.update_database(&session, database.id, &request).await?;
                println!(" - Database '{}' updated successfully", options.project);
                Ok(UploadOutcome::Updated)
            }
            None => {
                self.client.create_database(&session, &request).await?;
                println!(" - Database '{}' uploaded successfully", options.project);
                Ok(UploadOutcome::Created)
            }
        }
    }

    pub async fn sync_models(
        &self,
        options: &SyncOptions,
        target: &DbtTarget,
    ) -> Result<CommandOutput, MetabaseError> {
        println!(" - Synchronizing dbt models schema to Metabase...");
        if options.http {
            println!(" - Connecting with HTTP method...");
        } else {
            println!(" - Connecting with HTTPS method...");
        }
        let invocation = models_invocation(&self.dbt_metabase, options, target);
        debug!(
            "Running {} models for database {}",
            self.dbt_metabase,
            options.metabase_database()
        );
        let output = self.executor.execute(&invocation).await?;
        println!("{}", output.stdout);
        println!("{}", output.stderr);
        invocation.check_status(output.status_code)?;
        Ok(output)
    }

    /// Upload, then sync the models unless the upload was cancelled.
    pub async fn run(
        &self,
        options: &SyncOptions,
        confirm: &(dyn Fn(&str) -> std::io::Result<bool> + Sync),
    ) -> Result<UploadOutcome, MetabaseError> {
        let target = DbtTarget::resolve(options)?;
        self.run_target(options, &target, confirm).await
    }

    /// Like [`MetabaseSync::run`] for an already resolved dbt project.
    pub async fn run_target(
        &self,
        options: &SyncOptions,
        target: &DbtTarget,
        confirm: &(dyn Fn(&str) -> std::io::Result<bool> + Sync),
    ) -> Result<UploadOutcome, MetabaseError> {
        let outcome = self.upload(options, target, confirm).await?;
        if outcome != UploadOutcome::Cancelled {
            self.sync_models(options, target).await?;
        }
        Ok(outcome)
    }
}

fn absolute(path: &Path) -> Result<PathBuf, MetabaseError> {
    std::fs::canonicalize(path).map_err(|source| MetabaseError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::command::recording::RecordingExecutor;
    use crate::external::CommandError;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const METADATA: &str = r#"{"demo": {
        "description": "Demo",
        "sample_size": 2,
        "references": [],
        "bgcflow_version": "0.8.0",
        "rule_used": {
            "antismash": {"category": "Genome Mining", "description": "BGCs"},
            "seqfu": {"category": "QC", "description": "Stats"}
        }
    }}"#;

    fn options(bgcflow_dir: &Path, host: &str) -> SyncOptions {
        SyncOptions {
            project: "demo".to_string(),
            bgcflow_dir: bgcflow_dir.to_path_buf(),
            dbt_dir: None,
            host: host.to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            dbt_schema: "main".to_string(),
            dbt_database: "dbt_bgcflow".to_string(),
            http: true,
            metabase_database: None,
            dbt_excludes: Vec::new(),
        }
    }

    fn checkout() -> TempDir {
        let temp = TempDir::new().unwrap();
        let report = temp.path().join("data/processed/demo");
        fs::create_dir_all(report.join("metadata")).unwrap();
        fs::create_dir_all(report.join("dbt/antiSMASH_7.1.0")).unwrap();
        fs::write(report.join("metadata/project_metadata.json"), METADATA).unwrap();
        fs::write(
            report.join("metadata/dependency_versions.json"),
            r#"{"antismash": "7.1.0"}"#,
        )
        .unwrap();
        fs::write(report.join("dbt/antiSMASH_7.1.0").join(DUCKDB_FILE), "").unwrap();
        temp
    }

    fn always(_: &str) -> std::io::Result<bool> {
        Ok(true)
    }

    fn never(_: &str) -> std::io::Result<bool> {
        Ok(false)
    }

    async fn metabase_with(databases: serde_json::Value) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "token"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/database"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": databases })))
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_unused_pipelines_are_excluded() {
        let metadata = ProjectMetadata::from_json(METADATA).unwrap();
        let excludes = excluded_models(&metadata, &["custom_model".to_string()]);
        assert_eq!(
            excludes,
            vec![
                "custom_model",
                "bigfam_hits",
                "bigfam_network",
                "bigscape_cluster",
                "bigscape_network",
                "mibig_hits",
                "checkm"
            ]
        );
    }

    #[test]
    fn test_target_derived_from_results() {
        let checkout = checkout();
        let target = DbtTarget::resolve(&options(checkout.path(), "http://localhost:3000")).unwrap();
        assert_eq!(
            target.dir,
            checkout.path().join("data/processed/demo/dbt/antiSMASH_7.1.0")
        );
        assert!(target.excludes.contains(&"checkm".to_string()));
        assert!(!target.excludes.contains(&"genomes".to_string()));
    }

    #[test]
    fn test_explicit_dbt_dir_keeps_all_models() {
        let mut opts = options(Path::new("/unused"), "http://localhost:3000");
        opts.dbt_dir = Some(PathBuf::from("/dbt/project"));
        let target = DbtTarget::resolve(&opts).unwrap();
        assert_eq!(target.dir, PathBuf::from("/dbt/project"));
        assert!(target.excludes.is_empty());
    }

    #[test]
    fn test_models_invocation() {
        let opts = options(Path::new("."), "https://metabase.example.org");
        let target = DbtTarget {
            dir: PathBuf::from("/dbt"),
            excludes: vec!["checkm".to_string()],
        };
        let invocation = models_invocation("dbt-metabase", &opts, &target);
        assert_eq!(
            invocation.args,
            vec![
                "models",
                "--dbt_path",
                "/dbt",
                "--dbt_database",
                "dbt_bgcflow",
                "--metabase_host",
                "metabase.example.org",
                "--metabase_user",
                "admin",
                "--metabase_password",
                "secret",
                "--metabase_database",
                "demo",
                "--dbt_schema",
                "main",
                "--metabase_http",
                "--dbt_excludes",
                "checkm"
            ]
        );
    }

    #[tokio::test]
    async fn test_new_database_is_created_then_synced() {
        let checkout = checkout();
        let server = metabase_with(json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/database"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
            .expect(1)
            .mount(&server)
            .await;

        let executor = RecordingExecutor::new();
        let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
        let outcome = sync.run(&options(checkout.path(), &server.uri()), &always).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Created);
        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "dbt-metabase");
    }

    #[tokio::test]
    async fn test_failed_model_sync_is_an_error() {
        let checkout = checkout();
        let server = metabase_with(json!([])).await;
        Mock::given(method("POST"))
            .and(path("/api/database"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 4})))
            .mount(&server)
            .await;

        let executor = RecordingExecutor::with_status(2);
        let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
        let err = sync
            .run(&options(checkout.path(), &server.uri()), &always)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            MetabaseError::Command(CommandError::NonZeroExit { status_code: 2, .. })
        ));
        assert_eq!(executor.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_existing_database_is_updated_after_confirmation() {
        let checkout = checkout();
        let server = metabase_with(json!([{"id": 12, "name": "demo"}])).await;
        Mock::given(method("PUT"))
            .and(path("/api/database/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12})))
            .expect(1)
            .mount(&server)
            .await;

        let executor = RecordingExecutor::new();
        let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
        let outcome = sync.run(&options(checkout.path(), &server.uri()), &always).await.unwrap();
        assert_eq!(outcome, UploadOutcome::Updated);
    }

    #[tokio::test]
    async fn test_declined_update_skips_sync() {
        let checkout = checkout();
        let server = metabase_with(json!([{"id": 12, "name": "demo"}])).await;

        let executor = RecordingExecutor::new();
        let sync = MetabaseSync::new(MetabaseClient::new(&server.uri()).unwrap(), &executor, "dbt-metabase");
        let outcome = sync.run(&options(checkout.path(), &server.uri()), &never).await.unwrap();

        assert_eq!(outcome, UploadOutcome::Cancelled);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_duckdb_file_fails_before_login() {
        let temp = TempDir::new().unwrap();
        let executor = RecordingExecutor::new();
        let sync = MetabaseSync::new(
            MetabaseClient::new("http://127.0.0.1:9").unwrap(),
            &executor,
            "dbt-metabase",
        );
        let target = DbtTarget {
            dir: temp.path().to_path_buf(),
            excludes: Vec::new(),
        };
        let err = sync
            .upload(&options(temp.path(), "http://127.0.0.1:9"), &target, &always)
            .await
            .unwrap_err();
        assert!(matches!(err, MetabaseError::MissingDatabaseFile(_)));
    }
}
