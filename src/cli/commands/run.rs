use super::Command;
use crate::config::config;
use crate::external::ProcessCommandExecutor;
use crate::runner::{PipelineRunner, RunOptions};
use anyhow::Result;
use tracing::info;

pub struct RunCommand {
    pub options: RunOptions,
}

impl RunCommand {
    pub fn new(options: RunOptions) -> Self {
        Self { options }
    }
}

impl Command for RunCommand {
    async fn execute(&self) -> Result<()> {
        let config = config()?;
        let executor = ProcessCommandExecutor;
        let runner = PipelineRunner::new(&executor, config);
        runner.run(&self.options).await?;
        info!("Snakemake finished");
        Ok(())
    }
}
