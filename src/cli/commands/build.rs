use super::Command;
use crate::config::config;
use crate::external::snakemake::build_database;
use crate::external::{CommandExecutor, ProcessCommandExecutor};
use anyhow::Result;
use std::path::PathBuf;

pub struct BuildCommand {
    pub bgcflow_dir: PathBuf,
    pub cores: usize,
    pub dryrun: bool,
}

impl Command for BuildCommand {
    async fn execute(&self) -> Result<()> {
        let config = config()?;
        let invocation = build_database(&config.tools.snakemake, &self.bgcflow_dir, self.cores, self.dryrun);
        println!("Building Database with command:\n{invocation}");
        let status_code = ProcessCommandExecutor.run(&invocation).await?;
        invocation.check_status(status_code)?;
        Ok(())
    }
}
