use super::Command;
use crate::config::config;
use crate::external::ProcessCommandExecutor;
use crate::results::{list_items, processed_dir, ResultCopier};
use anyhow::Result;
use std::path::PathBuf;

pub struct GetResultCommand {
    pub project: String,
    pub copy: Option<PathBuf>,
    pub bgcflow_dir: PathBuf,
    pub copy_links: bool,
}

impl Command for GetResultCommand {
    async fn execute(&self) -> Result<()> {
        match &self.copy {
            None => {
                let items = list_items(&self.bgcflow_dir, &self.project)?;
                println!(
                    "Available items from {}:",
                    processed_dir(&self.bgcflow_dir, &self.project).display()
                );
                for item in items {
                    println!(" - {item}");
                }
                println!("Use --copy <DESTINATION> for copying items to destination path");
            }
            Some(destination) => {
                let executor = ProcessCommandExecutor;
                ResultCopier::new(&executor, config()?.tools.rsync.clone())
                    .copy(&self.bgcflow_dir, &self.project, destination, self.copy_links)
                    .await?;
            }
        }
        Ok(())
    }
}
