use super::Command;
use crate::config::config;
use crate::external::{CommandExecutor, Invocation, ProcessCommandExecutor};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct DeployCommand {
    pub destination: PathBuf,
    pub branch: String,
    pub tag: Option<String>,
}

impl DeployCommand {
    pub fn new(destination: PathBuf, branch: String, tag: Option<String>) -> Self {
        Self {
            destination,
            branch,
            tag,
        }
    }
}

/// `snakedeploy deploy-workflow <url> <dest> --name bgcflow (--tag T | --branch B)`
pub fn deploy_invocation(
    program: &str,
    repository: &str,
    destination: &Path,
    branch: &str,
    tag: Option<&str>,
) -> Invocation {
    let invocation = Invocation::new(program)
        .arg("deploy-workflow")
        .arg(repository)
        .arg(destination.to_string_lossy())
        .args(["--name", "bgcflow"]);
    match tag {
        Some(tag) => invocation.arg("--tag").arg(tag),
        None => invocation.arg("--branch").arg(branch),
    }
}

impl Command for DeployCommand {
    async fn execute(&self) -> Result<()> {
        let config = config()?;
        let invocation = deploy_invocation(
            &config.tools.snakedeploy,
            &config.repository.url,
            &self.destination,
            &self.branch,
            self.tag.as_deref(),
        );
        debug!("Running command: {invocation}");

        let status_code = ProcessCommandExecutor
            .run(&invocation)
            .await
            .context("Failed to run snakedeploy")?;
        invocation.check_status(status_code)?;
        println!("BGCFlow deployed to {}", self.destination.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_deploy() {
        let invocation = deploy_invocation(
            "snakedeploy",
            "https://github.com/NBChub/bgcflow.git",
            Path::new("/opt/bgcflow"),
            "main",
            None,
        );
        assert_eq!(
            invocation.to_string(),
            "snakedeploy deploy-workflow https://github.com/NBChub/bgcflow.git /opt/bgcflow --name bgcflow --branch main"
        );
    }

    #[test]
    fn test_tag_replaces_branch() {
        let invocation = deploy_invocation("snakedeploy", "repo", Path::new("d"), "main", Some("v0.8.0"));
        assert!(invocation.args.ends_with(&["--tag".to_string(), "v0.8.0".to_string()]));
        assert!(!invocation.args.contains(&"--branch".to_string()));
    }
}
