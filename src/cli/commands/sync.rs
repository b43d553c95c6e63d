use super::Command;
use crate::config::{config, MetabaseConfig};
use crate::external::ProcessCommandExecutor;
use crate::metabase::{DbtTarget, MetabaseClient, MetabaseSync, SyncOptions, UploadOutcome};
use crate::prompt;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

pub struct SyncCommand {
    pub project: String,
    pub bgcflow_dir: PathBuf,
    pub dbt_dir: Option<PathBuf>,
    pub metabase_host: Option<String>,
    pub mb_username: Option<String>,
    pub mb_password: Option<String>,
    pub dbt_schema: String,
    pub dbt_database: String,
    pub metabase_https: bool,
    pub metabase_database: Option<String>,
    pub dbt_excludes: Vec<String>,
    pub yes: bool,
}

/// Add the scheme when `host` is given as `host:port`.
pub fn host_url(host: &str, https: bool) -> String {
    if host.contains("://") {
        host.to_string()
    } else if https {
        format!("https://{host}")
    } else {
        format!("http://{host}")
    }
}

type Ask<'a> = &'a dyn Fn(&str) -> std::io::Result<String>;

impl SyncCommand {
    /// Resolve the dbt project and its DuckDB file, then ask for whatever
    /// credentials are still missing.
    pub fn prepare(
        &self,
        defaults: &MetabaseConfig,
        ask: Ask<'_>,
        ask_secret: Ask<'_>,
    ) -> Result<(SyncOptions, DbtTarget)> {
        let host = host_url(
            self.metabase_host.as_deref().unwrap_or(&defaults.host),
            self.metabase_https,
        );
        let mut options = SyncOptions {
            project: self.project.clone(),
            bgcflow_dir: self.bgcflow_dir.clone(),
            dbt_dir: self.dbt_dir.clone(),
            host,
            username: String::new(),
            password: String::new(),
            dbt_schema: self.dbt_schema.clone(),
            dbt_database: self.dbt_database.clone(),
            http: !self.metabase_https,
            metabase_database: self.metabase_database.clone(),
            dbt_excludes: self.dbt_excludes.clone(),
        };

        let target = DbtTarget::resolve(&options)?;
        target.database_file()?;

        options.username = match self.mb_username.clone().or_else(|| defaults.username.clone()) {
            Some(username) => username,
            None => ask("Enter your Metabase username:").context("Failed to read username")?,
        };
        options.password = match self.mb_password.clone().or_else(|| defaults.password.clone()) {
            Some(password) => password,
            None => ask_secret("Enter your Metabase password").context("Failed to read password")?,
        };
        Ok((options, target))
    }
}

impl Command for SyncCommand {
    async fn execute(&self) -> Result<()> {
        let config = config()?;
        let (options, target) = self.prepare(&config.metabase, &prompt::ask, &prompt::ask_secret)?;

        let executor = ProcessCommandExecutor;
        let sync = MetabaseSync::new(
            MetabaseClient::new(&options.host)?,
            &executor,
            config.tools.dbt_metabase.clone(),
        );
        let always_yes = |_: &str| -> std::io::Result<bool> { Ok(true) };
        let outcome = if self.yes {
            sync.run_target(&options, &target, &always_yes).await?
        } else {
            sync.run_target(&options, &target, &prompt::confirm).await?
        };

        if outcome != UploadOutcome::Cancelled {
            info!("Synced {} to {}", self.project, options.host);
        }
        Ok(())
    }
}
