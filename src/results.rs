//! Copying a project's processed outputs out of a BGCFlow checkout

use crate::external::{CommandError, CommandExecutor, Invocation};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ResultError {
    #[error("Cannot find project [{project}] results. Run `bgcflow init` to find available projects.")]
    MissingProject { project: String },
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Command(#[from] CommandError),
}

pub fn processed_dir(bgcflow_dir: &Path, project: &str) -> PathBuf {
    bgcflow_dir.join("data").join("processed").join(project)
}

/// Names of the entries under `data/processed/<project>`, sorted.
pub fn list_items(bgcflow_dir: &Path, project: &str) -> Result<Vec<String>, ResultError> {
    let dir = processed_dir(bgcflow_dir, project);
    if !dir.is_dir() {
        return Err(ResultError::MissingProject {
            project: project.to_string(),
        });
    }
    let entries = std::fs::read_dir(&dir).map_err(|source| ResultError::Io {
        path: dir.clone(),
        source,
    })?;
    let mut items = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ResultError::Io {
            path: dir.clone(),
            source,
        })?;
        items.push(entry.file_name().to_string_lossy().to_string());
    }
    items.sort();
    Ok(items)
}

/// `rsync -avPhr [-L] --exclude <project>/bigscape/*/cache <source> <destination>`
pub fn rsync_invocation(
    program: &str,
    source: &Path,
    destination: &Path,
    copy_links: bool,
) -> Invocation {
    let project = source
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut invocation = Invocation::new(program).arg("-avPhr");
    if copy_links {
        invocation = invocation.arg("-L");
    }
    invocation
        .arg("--exclude")
        .arg(format!("{project}/bigscape/*/cache"))
        .arg(source.to_string_lossy())
        .arg(destination.to_string_lossy())
}

pub struct ResultCopier<'a> {
    executor: &'a dyn CommandExecutor,
    rsync: String,
}

impl<'a> ResultCopier<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, rsync: impl Into<String>) -> Self {
        Self {
            executor,
            rsync: rsync.into(),
        }
    }

    pub async fn copy(
        &self,
        bgcflow_dir: &Path,
        project: &str,
        destination: &Path,
        copy_links: bool,
    ) -> Result<(), ResultError> {
        let bgcflow_dir = std::path::absolute(bgcflow_dir).map_err(|source| ResultError::Io {
            path: bgcflow_dir.to_path_buf(),
            source,
        })?;
        let source = processed_dir(&bgcflow_dir, project);
        if !source.is_dir() {
            return Err(ResultError::MissingProject {
                project: project.to_string(),
            });
        }

        let invocation = rsync_invocation(&self.rsync, &source, destination, copy_links);
        debug!("Running command: {invocation}");
        let status_code = self.executor.run(&invocation).await?;
        invocation.check_status(status_code)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::command::recording::RecordingExecutor;
    use std::fs;
    use tempfile::TempDir;

    fn checkout_with_results(project: &str) -> TempDir {
        let temp = TempDir::new().unwrap();
        let dir = processed_dir(temp.path(), project);
        fs::create_dir_all(dir.join("antismash")).unwrap();
        fs::create_dir_all(dir.join("metadata")).unwrap();
        fs::write(dir.join("samples.csv"), "genome_id\n").unwrap();
        temp
    }

    #[test]
    fn test_list_items_sorted() {
        let checkout = checkout_with_results("demo");
        let items = list_items(checkout.path(), "demo").unwrap();
        assert_eq!(items, vec!["antismash", "metadata", "samples.csv"]);
    }

    #[test]
    fn test_missing_project_suggests_init() {
        let checkout = TempDir::new().unwrap();
        let err = list_items(checkout.path(), "ghost").unwrap_err();
        assert!(err.to_string().contains("bgcflow init"));
    }

    #[test]
    fn test_rsync_arguments() {
        let invocation = rsync_invocation(
            "rsync",
            Path::new("/data/processed/demo"),
            Path::new("/tmp/out"),
            false,
        );
        assert_eq!(
            invocation.args,
            vec![
                "-avPhr",
                "--exclude",
                "demo/bigscape/*/cache",
                "/data/processed/demo",
                "/tmp/out"
            ]
        );
    }

    #[test]
    fn test_copy_links_adds_flag() {
        let invocation = rsync_invocation(
            "rsync",
            Path::new("/data/processed/demo"),
            Path::new("/tmp/out"),
            true,
        );
        assert_eq!(invocation.args[1], "-L");
    }

    #[tokio::test]
    async fn test_copier_runs_rsync_once() {
        let checkout = checkout_with_results("demo");
        let executor = RecordingExecutor::new();
        let copier = ResultCopier::new(&executor, "rsync");

        copier
            .copy(checkout.path(), "demo", Path::new("/tmp/out"), false)
            .await
            .unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "rsync");
        assert!(calls[0].args.contains(&"/tmp/out".to_string()));
    }

    #[tokio::test]
    async fn test_copier_reports_rsync_failure() {
        let checkout = checkout_with_results("demo");
        let executor = RecordingExecutor::with_status(23);
        let copier = ResultCopier::new(&executor, "rsync");

        let err = copier
            .copy(checkout.path(), "demo", Path::new("/tmp/out"), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ResultError::Command(CommandError::NonZeroExit { status_code: 23, .. })
        ));
    }
}
