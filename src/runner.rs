//! Run a BGCFlow Snakefile with the Panoptes sidecar around it

use crate::config::WrapperConfig;
use crate::external::{CommandError, CommandExecutor, SnakemakeRun};
use crate::monitor::{MonitorError, PanoptesMonitor};
use crate::workflows::{allocate_cores, available_cores, resolve_snakefile, SnakefileNotFound};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Snakefile(#[from] SnakefileNotFound),
    #[error(transparent)]
    Monitor(#[from] MonitorError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("Failed to resolve BGCFlow directory {}: {source}", .path.display())]
    BgcflowDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub bgcflow_dir: PathBuf,
    pub workflow: String,
    pub wms_monitor: String,
    pub cores: usize,
    pub dryrun: bool,
    pub touch: bool,
    pub unlock: bool,
    pub until: Option<String>,
    pub monitor_off: bool,
}

pub struct PipelineRunner<'a> {
    executor: &'a dyn CommandExecutor,
    config: &'a WrapperConfig,
    available_cores: usize,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, config: &'a WrapperConfig) -> Self {
        Self {
            executor,
            config,
            available_cores: available_cores(),
        }
    }

    pub fn with_available_cores(mut self, available_cores: usize) -> Self {
        self.available_cores = available_cores;
        self
    }

    /// Any monitor started here is stopped again before returning, even when
    /// Snakemake fails.
    pub async fn run(&self, options: &RunOptions) -> Result<i32, RunError> {
        let monitor = if options.monitor_off {
            None
        } else {
            let monitor = PanoptesMonitor::new(
                &options.wms_monitor,
                &self.config.tools.panoptes,
                &self.config.monitor,
            )?;
            Some(monitor.ensure_running().await?)
        };

        let result = self.run_snakemake(options).await;
        if let Some(handle) = monitor {
            if handle.started_here() && result.is_err() {
                warn!("Snakemake did not finish, stopping the Panoptes started for this run");
            }
            handle.stop().await;
        }
        result
    }

    async fn run_snakemake(&self, options: &RunOptions) -> Result<i32, RunError> {
        // Snakemake runs inside the checkout, so a relative Snakefile would resolve twice
        let bgcflow_dir =
            std::path::absolute(&options.bgcflow_dir).map_err(|source| RunError::BgcflowDir {
                path: options.bgcflow_dir.clone(),
                source,
            })?;
        let snakefile = resolve_snakefile(&bgcflow_dir, &options.workflow)?;

        let cores = allocate_cores(options.cores, self.available_cores);
        if cores.clamped() {
            warn!(
                "Number of cores inputted ({}) is higher than the number of available cores ({}). Setting number of cores to available cores: {}",
                cores.requested, cores.available, cores.granted
            );
        } else {
            info!("Using {} out of {} available cores", cores.granted, cores.available);
        }

        let run = SnakemakeRun {
            snakefile,
            cores: cores.granted,
            dryrun: options.dryrun,
            touch: options.touch,
            unlock: options.unlock,
            until: options.until.clone(),
            wms_monitor: (!options.monitor_off).then(|| options.wms_monitor.clone()),
        };
        let invocation = run.invocation(&self.config.tools.snakemake, &bgcflow_dir);
        println!("Running Snakemake with command:\n{invocation}");

        let status_code = self.executor.run(&invocation).await?;
        invocation.check_status(status_code)?;
        Ok(status_code)
    }
}
