use super::Command;
use crate::config::{config, WrapperConfig};
use crate::external::snakemake::{metabase_server, run_report};
use crate::external::{CommandExecutor, Invocation, ProcessCommandExecutor};
use crate::report::{self, OverwritePolicy, PageFormat, ReportOptions};
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const SNAKEMAKE_REPORT: &str = "snakemake_report";

pub struct ServeCommand {
    pub port: u16,
    pub file_server: String,
    pub bgcflow_dir: PathBuf,
    pub metabase: bool,
    pub project: Option<String>,
    pub yes: bool,
}

/// `jupyter nbconvert` rendering the run summary notebook into `data/processed`.
pub fn summary_notebook(jupyter: &str, bgcflow_dir: &Path) -> Invocation {
    let workflow_dir = bgcflow_dir.join("workflow");
    let output = bgcflow_dir.join("data").join("processed").join("index.html");
    let notebook = workflow_dir.join("notebook").join("99-entry_point.ipynb");
    Invocation::new(jupyter)
        .args(["nbconvert", "--execute", "--to", "html", "--output"])
        .arg(output.to_string_lossy())
        .arg(notebook.to_string_lossy())
        .args(["--no-input", "--template", "classic"])
        .current_dir(workflow_dir)
}

async fn run_checked(executor: &dyn CommandExecutor, invocation: &Invocation) -> Result<()> {
    debug!("Running command: {invocation}");
    let status_code = executor.run(invocation).await?;
    invocation.check_status(status_code)?;
    Ok(())
}

impl ServeCommand {
    async fn serve_snakemake_report(&self, config: &WrapperConfig, executor: &dyn CommandExecutor) -> Result<()> {
        let bgcflow_dir = std::path::absolute(&self.bgcflow_dir)
            .with_context(|| format!("Failed to resolve {}", self.bgcflow_dir.display()))?;
        let data_dir = bgcflow_dir.join("data");
        if !data_dir.is_dir() {
            bail!(
                "Cannot find BGCFlow results in {}. Run `bgcflow run` first.",
                data_dir.display()
            );
        }

        run_checked(executor, &run_report(&config.tools.snakemake, &bgcflow_dir)).await?;
        run_checked(executor, &summary_notebook(&config.tools.jupyter, &bgcflow_dir)).await?;
        report::serve_directory(&bgcflow_dir, self.port).await?;
        Ok(())
    }

    async fn serve_project(&self, project: &str, config: &WrapperConfig, executor: &dyn CommandExecutor) -> Result<()> {
        let options = ReportOptions {
            project: project.to_string(),
            bgcflow_dir: self.bgcflow_dir.clone(),
            port: self.port,
            file_server: self.file_server.clone(),
            format: PageFormat::Markdown,
            overwrite: if self.yes {
                OverwritePolicy::Always
            } else {
                OverwritePolicy::Ask
            },
        };
        let prepared = report::prepare(&options)?;
        report::serve(
            executor,
            &config.tools.mkdocs,
            &prepared,
            &options,
            Path::new(&config.report.server_log),
        )
        .await?;
        Ok(())
    }
}

impl Command for ServeCommand {
    async fn execute(&self) -> Result<()> {
        let config = config()?;
        let executor = ProcessCommandExecutor;

        if self.metabase {
            return run_checked(&executor, &metabase_server(&config.tools.snakemake, &self.bgcflow_dir)).await;
        }

        match self.project.as_deref() {
            None => {
                println!("Use `bgcflow serve --project <project name>` to generate and serve a project report.");
                println!("To see the Snakemake run summary, use `bgcflow serve --project {SNAKEMAKE_REPORT}`.");
                Ok(())
            }
            Some(SNAKEMAKE_REPORT) => self.serve_snakemake_report(config, &executor).await,
            Some(project) => self.serve_project(project, config, &executor).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_notebook_runs_in_workflow_dir() {
        let invocation = summary_notebook("jupyter", Path::new("/opt/bgcflow"));
        assert_eq!(
            invocation.current_dir.as_deref(),
            Some(Path::new("/opt/bgcflow/workflow"))
        );
        assert_eq!(
            invocation.args,
            vec![
                "nbconvert",
                "--execute",
                "--to",
                "html",
                "--output",
                "/opt/bgcflow/data/processed/index.html",
                "/opt/bgcflow/workflow/notebook/99-entry_point.ipynb",
                "--no-input",
                "--template",
                "classic",
            ]
        );
    }
}
