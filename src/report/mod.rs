//! Project report generation and serving
//!
//! A BGCFlow run leaves `metadata/project_metadata.json` in the project's
//! processed directory. The report generator turns it into an MkDocs site,
//! serves the raw result files next to it and hands over to `mkdocs serve`.

pub mod metadata;
pub mod mkdocs;
pub mod server;

use crate::external::{CommandError, CommandExecutor, Invocation};
use crate::shutdown::{until_interrupted, Completion};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub use metadata::{locate_report_dir, ProjectMetadata, RuleUsage};
pub use mkdocs::{GeneratedSite, OverwritePolicy, PageFormat, SiteWriter};
pub use server::StaticFileServer;

pub const DEFAULT_FILE_SERVER: &str = "http://localhost:8002";
pub const FAREWELL: &str = "Thank you for using BGCFlow Report!";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Unable to find BGCFlow results in {}", .0.display())]
    MissingResults(PathBuf),
    #[error("Project metadata does not match with user provided input! Expected '{expected}', found '{found}'")]
    ProjectMismatch { expected: String, found: String },
    #[error("{} does not list a version for {dependency}", .path.display())]
    MissingDependency { path: PathBuf, dependency: String },
    #[error("Invalid file server address {0}")]
    InvalidFileServer(String),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to render {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to start file server on {addr}: {source}")]
    Server {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ReportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn yaml(path: &Path, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Contents of `bgcflow_wrapper.log`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerLog {
    pub report_server: u16,
    pub file_server: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
}

impl ServerLog {
    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ReportError::json(path, e))?;
        std::fs::write(path, text).map_err(|e| ReportError::io(path, e))
    }
}

#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub project: String,
    pub bgcflow_dir: PathBuf,
    pub port: u16,
    pub file_server: String,
    pub format: PageFormat,
    pub overwrite: OverwritePolicy,
}

/// A report directory with its MkDocs files in place
#[derive(Debug)]
pub struct PreparedReport {
    pub report_dir: PathBuf,
    pub metadata: ProjectMetadata,
    pub site: GeneratedSite,
}

/// Locate the results, validate the metadata and write the MkDocs site.
pub fn prepare(options: &ReportOptions) -> Result<PreparedReport, ReportError> {
    info!("Checking input folder..");
    let report_dir = locate_report_dir(&options.bgcflow_dir, &options.project)?;
    debug!(
        "Found project_metadata. Using [{}] as report directory.",
        report_dir.display()
    );

    let metadata = ProjectMetadata::load(&report_dir.join(metadata::PROJECT_METADATA))?;
    if metadata.name != options.project {
        return Err(ReportError::ProjectMismatch {
            expected: options.project.clone(),
            found: metadata.name,
        });
    }
    debug!(
        "Project [{}] was analysed using BGCFlow version {}",
        metadata.name, metadata.bgcflow_version
    );
    debug!(
        "Available reports: {:?}",
        metadata.rule_names().collect::<Vec<_>>()
    );

    let site = SiteWriter::new(&report_dir, options.overwrite).write(
        &metadata,
        &options.file_server,
        options.format,
    )?;

    Ok(PreparedReport {
        report_dir,
        metadata,
        site,
    })
}

fn file_server_port(file_server: &str) -> Result<u16, ReportError> {
    url::Url::parse(file_server)
        .ok()
        .and_then(|url| url.port_or_known_default())
        .ok_or_else(|| ReportError::InvalidFileServer(file_server.to_string()))
}

pub fn mkdocs_serve(program: &str, report_dir: &Path, port: u16) -> Invocation {
    Invocation::new(program)
        .arg("serve")
        .arg("-a")
        .arg(format!("localhost:{port}"))
        .current_dir(report_dir)
}

/// Serve a prepared report until `mkdocs serve` exits or Ctrl-C.
///
/// The local file server only runs when the default file server address is
/// used; the server log always records where the files are served from.
pub async fn serve(
    executor: &dyn CommandExecutor,
    mkdocs: &str,
    report: &PreparedReport,
    options: &ReportOptions,
    server_log: &Path,
) -> Result<(), ReportError> {
    let file_server = if options.file_server == DEFAULT_FILE_SERVER {
        let addr = SocketAddr::from(([127, 0, 0, 1], file_server_port(&options.file_server)?));
        let server = StaticFileServer::start(&report.report_dir, addr)
            .await
            .map_err(|source| ReportError::Server { addr, source })?;
        info!("Running http file-server. Job id: {}", std::process::id());
        Some(server)
    } else {
        None
    };

    ServerLog {
        report_server: options.port,
        file_server: options.file_server.clone(),
        pid: file_server.as_ref().map(|_| std::process::id()),
    }
    .write(server_log)?;

    let invocation = mkdocs_serve(mkdocs, &report.report_dir, options.port);
    debug!("Running command: {invocation}");
    let outcome = until_interrupted(executor.run(&invocation)).await;

    if let Some(server) = file_server {
        server.stop().await;
    }

    match outcome {
        Completion::Interrupted => {
            println!("\n{FAREWELL}");
            Ok(())
        }
        Completion::Finished(result) => {
            let status_code = result?;
            println!("{FAREWELL}");
            invocation.check_status(status_code)?;
            Ok(())
        }
    }
}

/// Serve `root` on `port` until Ctrl-C.
pub async fn serve_directory(root: &Path, port: u16) -> Result<(), ReportError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let server = StaticFileServer::start(root, addr)
        .await
        .map_err(|source| ReportError::Server { addr, source })?;
    println!("Serving report at http://localhost:{port}/ (Ctrl-C to stop)");
    if let Err(e) = crate::shutdown::interrupted().await {
        tracing::warn!("Failed to wait for Ctrl-C: {e}");
    }
    server.stop().await;
    Ok(())
}
