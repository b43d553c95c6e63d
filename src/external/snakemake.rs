//! Snakemake command lines
//!
//! Every call the wrapper makes into the workflow engine is built here so the
//! exact flags live in one place.

use super::command::Invocation;
use std::path::{Path, PathBuf};

/// Options for a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct SnakemakeRun {
    pub snakefile: PathBuf,
    pub cores: usize,
    pub dryrun: bool,
    pub touch: bool,
    pub unlock: bool,
    pub until: Option<String>,
    pub wms_monitor: Option<String>,
}

impl SnakemakeRun {
    pub fn invocation(&self, program: &str, bgcflow_dir: &Path) -> Invocation {
        let mut invocation = Invocation::new(program)
            .arg("--snakefile")
            .arg(self.snakefile.display().to_string())
            .args([
                "--use-conda",
                "--keep-going",
                "--rerun-incomplete",
                "--rerun-triggers",
                "mtime",
                "-c",
            ])
            .arg(self.cores.to_string())
            .current_dir(bgcflow_dir);

        if self.dryrun {
            invocation = invocation.arg("--dryrun");
        }
        if self.touch {
            invocation = invocation.arg("--touch");
        }
        if let Some(rule) = &self.until {
            invocation = invocation.arg("--until").arg(rule.clone());
        }
        if self.unlock {
            invocation = invocation.arg("--unlock");
        }
        if let Some(address) = &self.wms_monitor {
            invocation = invocation.arg("--wms-monitor").arg(address.clone());
        }
        invocation
    }
}

/// `snakemake --use-conda -c N --snakefile workflow/Database --keep-going`
pub fn build_database(program: &str, bgcflow_dir: &Path, cores: usize, dryrun: bool) -> Invocation {
    let invocation = Invocation::new(program)
        .arg("--use-conda")
        .arg("-c")
        .arg(cores.to_string())
        .args(["--snakefile", "workflow/Database", "--keep-going"])
        .current_dir(bgcflow_dir);
    if dryrun {
        invocation.arg("--dryrun")
    } else {
        invocation
    }
}

pub fn metabase_server(program: &str, bgcflow_dir: &Path) -> Invocation {
    Invocation::new(program)
        .args(["--snakefile", "workflow/Metabase", "-c", "1"])
        .current_dir(bgcflow_dir)
}

pub fn run_report(program: &str, bgcflow_dir: &Path) -> Invocation {
    Invocation::new(program)
        .args(["--report", "index.html"])
        .current_dir(bgcflow_dir)
}
