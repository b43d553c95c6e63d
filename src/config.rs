use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the BGCFlow wrapper
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WrapperConfig {
    /// Where BGCFlow is cloned or deployed from
    pub repository: RepositoryConfig,
    /// Names or paths of the external executables
    pub tools: ToolsConfig,
    /// Panoptes sidecar settings
    pub monitor: MonitorConfig,
    /// Report generator settings
    pub report: ReportConfig,
    /// Metabase connection defaults
    pub metabase: MetabaseConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RepositoryConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    pub snakemake: String,
    pub panoptes: String,
    pub rsync: String,
    pub mkdocs: String,
    pub jupyter: String,
    pub snakedeploy: String,
    pub dbt_metabase: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// How many times to poll the service-info endpoint before giving up
    pub connect_attempts: u32,
    /// Delay between polls
    pub retry_interval_ms: u64,
}

impl MonitorConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportConfig {
    /// JSON file recording the report and file server addresses
    pub server_log: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetabaseConfig {
    pub host: String,
    pub username: Option<String>,
    /// Never written by `save_to_file`
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            repository: RepositoryConfig {
                url: "https://github.com/NBChub/bgcflow.git".to_string(),
            },
            tools: ToolsConfig {
                snakemake: "snakemake".to_string(),
                panoptes: "panoptes".to_string(),
                rsync: "rsync".to_string(),
                mkdocs: "mkdocs".to_string(),
                jupyter: "jupyter".to_string(),
                snakedeploy: "snakedeploy".to_string(),
                dbt_metabase: "dbt-metabase".to_string(),
            },
            monitor: MonitorConfig {
                connect_attempts: 10,
                retry_interval_ms: 1000,
            },
            report: ReportConfig {
                server_log: "bgcflow_wrapper.log".to_string(),
            },
            metabase: MetabaseConfig {
                host: "http://localhost:3000".to_string(),
                username: None,
                password: None,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl WrapperConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (bgcflow-wrapper.toml, .bgcflow-wrapper-rc)
    /// 3. Environment variables (prefixed with BGCFLOW_WRAPPER_)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("bgcflow-wrapper.toml").exists() {
            builder = builder.add_source(File::with_name("bgcflow-wrapper"));
        }

        if Path::new(".bgcflow-wrapper-rc").exists() {
            builder = builder.add_source(
                File::with_name(".bgcflow-wrapper-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("BGCFLOW_WRAPPER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut wrapper_config: WrapperConfig = builder.build()?.try_deserialize()?;

        // Metabase credentials may also come from the conventional variables
        if wrapper_config.metabase.username.is_none() {
            if let Ok(username) = std::env::var("METABASE_USERNAME") {
                wrapper_config.metabase.username = Some(username);
            }
        }
        if wrapper_config.metabase.password.is_none() {
            if let Ok(password) = std::env::var("METABASE_PASSWORD") {
                wrapper_config.metabase.password = Some(password);
            }
        }

        Ok(wrapper_config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::debug!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<WrapperConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = WrapperConfig::load_env_file();
        WrapperConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static WrapperConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
