//! `metadata/project_metadata.json` written by a BGCFlow run

use super::ReportError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub const PROJECT_METADATA: &str = "metadata/project_metadata.json";
pub const DEPENDENCY_VERSIONS: &str = "metadata/dependency_versions.json";

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RuleUsage {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct ProjectDetails {
    #[serde(default)]
    description: String,
    #[serde(default)]
    sample_size: Value,
    #[serde(default)]
    references: Vec<String>,
    #[serde(default)]
    bgcflow_version: String,
    #[serde(default)]
    rule_used: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ProjectMetadata {
    pub name: String,
    pub description: String,
    pub sample_size: Value,
    pub references: Vec<String>,
    pub bgcflow_version: String,
    /// Rules in the order the run recorded them
    pub rule_used: Vec<(String, RuleUsage)>,
}

impl ProjectMetadata {
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let text = std::fs::read_to_string(path).map_err(|e| ReportError::io(path, e))?;
        Self::from_json(&text).map_err(|e| ReportError::json(path, e))
    }

    /// The document is a single-key object: `{ "<project>": { ... } }`.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let document: Map<String, Value> = serde_json::from_str(text)?;
        let Some((name, details)) = document.into_iter().next() else {
            return Err(serde::de::Error::custom("project metadata is empty"));
        };
        let details: ProjectDetails = serde_json::from_value(details)?;

        let mut rule_used = Vec::with_capacity(details.rule_used.len());
        for (rule, usage) in details.rule_used {
            rule_used.push((rule, serde_json::from_value(usage)?));
        }

        Ok(Self {
            name,
            description: details.description,
            sample_size: details.sample_size,
            references: details.references,
            bgcflow_version: details.bgcflow_version,
            rule_used,
        })
    }

    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rule_used.iter().map(|(rule, _)| rule.as_str())
    }

    pub fn uses_rule(&self, rule: &str) -> bool {
        self.rule_names().any(|name| name == rule)
    }
}

/// Directory holding a project's report inputs.
///
/// A results directory copied out of BGCFlow is used as is; otherwise the
/// project is looked up under `data/processed/<project>`.
pub fn locate_report_dir(bgcflow_dir: &Path, project: &str) -> Result<PathBuf, ReportError> {
    if bgcflow_dir.join(PROJECT_METADATA).is_file() {
        return Ok(bgcflow_dir.to_path_buf());
    }
    let report_dir = crate::results::processed_dir(bgcflow_dir, project);
    if report_dir.join(PROJECT_METADATA).is_file() {
        Ok(report_dir)
    } else {
        Err(ReportError::MissingResults(report_dir))
    }
}

/// The antiSMASH version recorded in `metadata/dependency_versions.json`
pub fn antismash_version(report_dir: &Path) -> Result<String, ReportError> {
    let path = report_dir.join(DEPENDENCY_VERSIONS);
    let text = std::fs::read_to_string(&path).map_err(|e| ReportError::io(&path, e))?;
    let versions: Map<String, Value> =
        serde_json::from_str(&text).map_err(|e| ReportError::json(&path, e))?;
    match versions.get("antismash") {
        Some(Value::String(version)) => Ok(version.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(ReportError::MissingDependency {
            path,
            dependency: "antismash".to_string(),
        }),
    }
}
