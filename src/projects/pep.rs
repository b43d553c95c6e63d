//! PEP project files: `project_config.yaml` and the sample table

use super::ProjectError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PEP_VERSION: &str = "2.1.0";
pub const SAMPLES_FILE: &str = "samples.csv";
pub const PROKKA_DB_FILE: &str = "prokka-db.csv";
pub const GTDB_TAX_FILE: &str = "gtdbtk.bac120.summary.tsv";
pub const PROJECT_CONFIG_FILE: &str = "project_config.yaml";

const DESCRIPTION_PLACEHOLDER: &str = "<TO DO: give a description to your project>";
const PROKKA_DB_PLACEHOLDER: &str = "OPTIONAL: relative path to your `prokka-db.csv`";
const GTDB_TAX_PLACEHOLDER: &str = "OPTIONAL: relative path to your `gtdbtk.bac120.summary.tsv`";

pub const SAMPLE_COLUMNS: [&str; 7] = [
    "genome_id",
    "source",
    "organism",
    "genus",
    "species",
    "strain",
    "closest_placement_reference",
];

/// Serialized field order is the order keys appear in the written file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub pep_version: String,
    pub description: String,
    pub sample_table: String,
    #[serde(rename = "prokka-db")]
    pub prokka_db: String,
    #[serde(rename = "gtdb-tax")]
    pub gtdb_tax: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<serde_yaml::Mapping>,
}

impl ProjectConfig {
    pub fn template(name: &str, pep_version: &str) -> Self {
        Self {
            name: name.to_string(),
            pep_version: pep_version.to_string(),
            description: DESCRIPTION_PLACEHOLDER.to_string(),
            sample_table: SAMPLES_FILE.to_string(),
            prokka_db: PROKKA_DB_PLACEHOLDER.to_string(),
            gtdb_tax: GTDB_TAX_PLACEHOLDER.to_string(),
            rules: None,
        }
    }

    /// Every pipeline switched off, for per-project pipeline selection
    pub fn with_rules_disabled<'a>(mut self, pipelines: impl Iterator<Item = &'a str>) -> Self {
        let rules = pipelines
            .map(|name| {
                (
                    serde_yaml::Value::String(name.to_string()),
                    serde_yaml::Value::String("FALSE".to_string()),
                )
            })
            .collect();
        self.rules = Some(rules);
        self
    }

    pub fn write(&self, path: &Path) -> Result<(), ProjectError> {
        let text = serde_yaml::to_string(self).map_err(|e| ProjectError::yaml(path, e))?;
        std::fs::write(path, text).map_err(|e| ProjectError::io(path, e))
    }
}

/// The parts of an existing PEP file needed to list projects
#[derive(Debug, Clone, Deserialize)]
pub struct PepSummary {
    pub name: String,
    pub sample_table: String,
}

impl PepSummary {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let text = std::fs::read_to_string(path).map_err(|e| ProjectError::io(path, e))?;
        serde_yaml::from_str(&text).map_err(|e| ProjectError::yaml(path, e))
    }
}

/// One row of `samples.csv`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub genome_id: String,
    pub source: String,
    pub organism: String,
    pub genus: String,
    pub species: String,
    pub strain: String,
    pub closest_placement_reference: String,
}

/// Where a new project's samples come from
#[derive(Debug, Clone)]
pub enum SampleSource {
    /// Existing CSV to copy
    Csv(std::path::PathBuf),
    /// Rows to write
    Records(Vec<SampleRecord>),
}

pub fn write_sample_table(records: &[SampleRecord], path: &Path) -> Result<(), ProjectError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| ProjectError::csv(path, e))?;
    writer
        .write_record(SAMPLE_COLUMNS)
        .map_err(|e| ProjectError::csv(path, e))?;
    for record in records {
        writer.serialize(record).map_err(|e| ProjectError::csv(path, e))?;
    }
    writer.flush().map_err(|e| ProjectError::io(path, e))
}
