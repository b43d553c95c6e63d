use git2::build::RepoBuilder;
use git2::{FetchOptions, Progress, RemoteCallbacks, Repository};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("{} already exists and is not an empty directory", .path.display())]
    DestinationNotEmpty { path: PathBuf },
    #[error("Failed to prepare destination {}: {source}", .path.display())]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to clone {url} (branch {branch}): {source}")]
    Clone {
        url: String,
        branch: String,
        #[source]
        source: git2::Error,
    },
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
}

/// Trait defining the git operations the wrapper needs
#[cfg_attr(test, automock)]
pub trait GitOperations {
    /// Clone `url` into `destination` with `branch` checked out (replaces `git clone -b`)
    fn clone_branch(&self, url: &str, destination: &Path, branch: &str) -> Result<Repository, GitError>;

    /// Name of the branch HEAD points at, if any
    fn current_branch(&self, repo: &Repository) -> Result<Option<String>, GitError> {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(head.shorthand().map(str::to_string))
    }
}

/// Implementation of GitOperations using git2
#[derive(Debug, Default)]
pub struct Git2Operations;

impl Git2Operations {
    pub fn new() -> Self {
        Self
    }

    fn ensure_empty_destination(destination: &Path) -> Result<(), GitError> {
        std::fs::create_dir_all(destination).map_err(|source| GitError::Destination {
            path: destination.to_path_buf(),
            source,
        })?;
        let mut entries = std::fs::read_dir(destination).map_err(|source| GitError::Destination {
            path: destination.to_path_buf(),
            source,
        })?;
        if entries.next().is_some() {
            return Err(GitError::DestinationNotEmpty {
                path: destination.to_path_buf(),
            });
        }
        Ok(())
    }
}

fn log_progress(progress: Progress<'_>) -> bool {
    if progress.received_objects() == progress.total_objects() {
        debug!(
            "Resolving deltas {}/{}",
            progress.indexed_deltas(),
            progress.total_deltas()
        );
    }
    true
}

impl GitOperations for Git2Operations {
    fn clone_branch(&self, url: &str, destination: &Path, branch: &str) -> Result<Repository, GitError> {
        Self::ensure_empty_destination(destination)?;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.transfer_progress(log_progress);
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(callbacks);

        RepoBuilder::new()
            .branch(branch)
            .fetch_options(fetch_options)
            .clone(url, destination)
            .map_err(|source| GitError::Clone {
                url: url.to_string(),
                branch: branch.to_string(),
                source,
            })
    }
}
