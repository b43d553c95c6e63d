//! The global `config/config.yaml` of a BGCFlow checkout
//!
//! The file carries many keys the wrapper does not understand, so it is kept
//! as an ordered YAML mapping and only the project lists are touched.

use super::ProjectError;
use serde_yaml::{Mapping, Value};
use std::path::Path;

pub const PROJECT_SECTIONS: [&str; 2] = ["projects", "bgc_projects"];

/// One entry of a project list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEntry {
    /// Project name, or the path of a PEP file
    pub name: String,
    /// Sample table for entries that are not PEP files
    pub samples: Option<String>,
}

impl ProjectEntry {
    pub fn is_pep_file(&self) -> bool {
        self.name.ends_with(".yaml")
    }
}

#[derive(Debug, Clone)]
pub struct GlobalConfig {
    doc: Mapping,
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

/// Rename `from` to `to` in place, keeping the entry's position.
fn rename_key(mapping: Mapping, from: &str, to: &str) -> Mapping {
    if !mapping.contains_key(from) || mapping.contains_key(to) {
        return mapping;
    }
    mapping
        .into_iter()
        .map(|(k, v)| if k.as_str() == Some(from) { (key(to), v) } else { (k, v) })
        .collect()
}

impl GlobalConfig {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let text = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        Self::from_yaml(&text).map_err(|e| ProjectError::yaml(path, e))
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let value: Value = serde_yaml::from_str(text)?;
        let doc = match value {
            Value::Mapping(doc) => doc,
            Value::Null => Mapping::new(),
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a mapping at the top level, found {other:?}"
                )))
            }
        };
        Ok(Self { doc })
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.doc)
    }

    pub fn save(&self, path: &Path) -> Result<(), ProjectError> {
        let text = self.to_yaml().map_err(|e| ProjectError::yaml(path, e))?;
        std::fs::write(path, text).map_err(|e| ProjectError::io(path, e))
    }

    /// Rewrite legacy keys: `pep` entries become `name`, `pipelines` becomes `rules`.
    pub fn normalize(&mut self) {
        if let Some(Value::Sequence(projects)) = self.doc.get_mut("projects") {
            for item in projects.iter_mut() {
                if let Value::Mapping(entry) = item {
                    *entry = rename_key(std::mem::take(entry), "pep", "name");
                }
            }
        }
        self.doc = rename_key(std::mem::take(&mut self.doc), "pipelines", "rules");
    }

    pub fn entries(&self, section: &str) -> Vec<ProjectEntry> {
        let Some(Value::Sequence(items)) = self.doc.get(section) else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(Value::as_mapping)
            .filter_map(|entry| {
                let name = entry
                    .get("name")
                    .or_else(|| entry.get("pep"))
                    .and_then(Value::as_str)?;
                Some(ProjectEntry {
                    name: name.to_string(),
                    samples: entry.get("samples").and_then(Value::as_str).map(str::to_string),
                })
            })
            .collect()
    }

    pub fn contains_project(&self, name: &str) -> bool {
        self.entries("projects").iter().any(|entry| entry.name == name)
    }

    pub fn add_project(&mut self, name: &str) {
        let mut entry = Mapping::new();
        entry.insert(key("name"), key(name));

        match self.doc.get_mut("projects") {
            Some(Value::Sequence(projects)) => projects.push(Value::Mapping(entry)),
            _ => {
                self.doc
                    .insert(key("projects"), Value::Sequence(vec![Value::Mapping(entry)]));
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.doc.get(name)
    }
}
