//! Project scaffolding for a BGCFlow checkout
//!
//! Creates the global `config/config.yaml` from the bundled template, lists the
//! configured projects and generates new PEP projects under `config/<name>/`.

pub mod global_config;
pub mod pep;
pub mod scaffold;

use crate::workflows::CatalogError;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use global_config::{GlobalConfig, ProjectEntry};
pub use pep::{ProjectConfig, SampleRecord, SampleSource};
pub use scaffold::{InitOutcome, NewProject, ProjectScaffolder, ProjectSummary};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Cannot find template file {}. Are you using BGCFlow version >= 0.4.1?", .0.display())]
    MissingTemplate(PathBuf),
    #[error("Project name: '{name}' already exists!\nUse a different name or edit the files in: {}", .project_dir.display())]
    ProjectExists { name: String, project_dir: PathBuf },
    #[error("Invalid project name '{0}': use a plain name without path separators")]
    InvalidName(String),
    #[error("Input file {} does not exist", .0.display())]
    MissingInput(PathBuf),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid YAML in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to write sample table {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{0}")]
    Copy(String),
}

impl ProjectError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn yaml(path: &Path, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Errors that mean the directory is not a BGCFlow checkout
    pub fn is_missing_bgcflow_dir(&self) -> bool {
        match self {
            ProjectError::MissingTemplate(_) => true,
            ProjectError::Catalog(CatalogError::NotFound(_)) => true,
            ProjectError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
