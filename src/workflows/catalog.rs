//! Pipeline catalog read from `workflow/rules.yaml`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Cannot find {}", .0.display())]
    NotFound(PathBuf),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Cannot find rule {0:?} in dictionary. Find available rules with `bgcflow pipelines`.")]
    UnknownPipeline(Vec<String>),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineInfo {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub references: Vec<String>,
}

/// Pipelines in the order they appear in `rules.yaml`
#[derive(Debug, Clone, Default)]
pub struct PipelineCatalog {
    entries: Vec<(String, PipelineInfo)>,
}

impl PipelineCatalog {
    pub fn path_in(bgcflow_dir: &Path) -> PathBuf {
        bgcflow_dir.join("workflow").join("rules.yaml")
    }

    pub fn load(bgcflow_dir: &Path) -> Result<Self, CatalogError> {
        let path = Self::path_in(bgcflow_dir);
        if !path.is_file() {
            return Err(CatalogError::NotFound(path));
        }
        let text = std::fs::read_to_string(&path).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| CatalogError::Parse { path, source })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(text)?;
        let mut entries = Vec::with_capacity(mapping.len());
        for (key, value) in mapping {
            let name = match key {
                serde_yaml::Value::String(name) => name,
                other => serde_yaml::to_string(&other)?.trim().to_string(),
            };
            let info = if value.is_null() {
                PipelineInfo::default()
            } else {
                serde_yaml::from_value(value)?
            };
            entries.push((name, info));
        }
        Ok(Self { entries })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&PipelineInfo> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, info)| info)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
