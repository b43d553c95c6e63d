use super::Command;
use crate::config::config;
use crate::git::{Git2Operations, GitError, GitOperations};
use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

pub struct CloneCommand {
    pub destination: PathBuf,
    pub branch: String,
}

impl CloneCommand {
    pub fn new(destination: PathBuf, branch: String) -> Self {
        Self { destination, branch }
    }

    /// A non-empty destination is reported, not treated as a failure.
    pub fn clone_with(&self, git: &dyn GitOperations, url: &str) -> Result<()> {
        println!("Cloning BGCFlow to {}...", self.destination.display());
        match git.clone_branch(url, &self.destination, &self.branch) {
            Ok(repo) => {
                let branch = git
                    .current_branch(&repo)
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| self.branch.clone());
                info!("Cloned {url} ({branch}) into {}", self.destination.display());
                Ok(())
            }
            Err(GitError::DestinationNotEmpty { .. }) => {
                println!(
                    "Oops, it seems {} already exists and is not an empty directory.",
                    self.destination.display()
                );
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Command for CloneCommand {
    async fn execute(&self) -> Result<()> {
        let url = config()?.repository.url.clone();
        let command = Self::new(self.destination.clone(), self.branch.clone());
        tokio::task::spawn_blocking(move || command.clone_with(&Git2Operations::new(), &url)).await?
    }
}
