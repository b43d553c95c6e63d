use super::global_config::{GlobalConfig, PROJECT_SECTIONS};
use super::pep::{
    self, PepSummary, ProjectConfig, SampleSource, DEFAULT_PEP_VERSION, GTDB_TAX_FILE,
    PROJECT_CONFIG_FILE, PROKKA_DB_FILE, SAMPLES_FILE,
};
use super::ProjectError;
use crate::workflows::PipelineCatalog;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const TEMPLATE_CONFIG: &str = ".examples/_config_example.yaml";

/// A configured project as shown by `bgcflow init`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub name: String,
    pub sample_table: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A global config already existed
    Existing(Vec<ProjectSummary>),
    /// The global config was generated; lists the example project dirs copied
    Generated(Vec<PathBuf>),
}

/// Everything needed to generate one PEP project
#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub pep_version: String,
    pub use_project_rules: bool,
    pub samples: Option<SampleSource>,
    pub prokka_db: Option<PathBuf>,
    pub gtdb_tax: Option<PathBuf>,
    pub description: Option<String>,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pep_version: DEFAULT_PEP_VERSION.to_string(),
            use_project_rules: false,
            samples: None,
            prokka_db: None,
            gtdb_tax: None,
            description: None,
        }
    }
}

pub struct ProjectScaffolder {
    bgcflow_dir: PathBuf,
}

impl ProjectScaffolder {
    pub fn new(bgcflow_dir: &Path) -> Result<Self, ProjectError> {
        let bgcflow_dir =
            std::path::absolute(bgcflow_dir).map_err(|e| ProjectError::io(bgcflow_dir, e))?;
        Ok(Self { bgcflow_dir })
    }

    pub fn bgcflow_dir(&self) -> &Path {
        &self.bgcflow_dir
    }

    pub fn config_dir(&self) -> PathBuf {
        self.bgcflow_dir.join("config")
    }

    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir().join("config.yaml")
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.config_dir().join(name)
    }

    fn ensure_config_dir(&self) -> Result<(), ProjectError> {
        let config_dir = self.config_dir();
        std::fs::create_dir_all(&config_dir).map_err(|e| ProjectError::io(&config_dir, e))
    }

    /// List projects from an existing global config, or generate one.
    pub fn init(&self) -> Result<InitOutcome, ProjectError> {
        self.ensure_config_dir()?;
        let global_config = self.global_config_path();
        if global_config.is_file() {
            debug!("Found config file at: {}", global_config.display());
            Ok(InitOutcome::Existing(self.list_projects()?))
        } else {
            Ok(InitOutcome::Generated(self.generate_global_config()?))
        }
    }

    pub fn list_projects(&self) -> Result<Vec<ProjectSummary>, ProjectError> {
        let config = GlobalConfig::load(&self.global_config_path())?;
        config
            .entries("projects")
            .into_iter()
            .map(|entry| {
                if entry.is_pep_file() {
                    let pep = PepSummary::load(&self.bgcflow_dir.join(&entry.name))?;
                    Ok(ProjectSummary {
                        name: pep.name,
                        sample_table: pep.sample_table,
                    })
                } else {
                    Ok(ProjectSummary {
                        sample_table: entry.samples.unwrap_or_default(),
                        name: entry.name,
                    })
                }
            })
            .collect()
    }

    /// Copy the template config and the example projects it references.
    pub fn generate_global_config(&self) -> Result<Vec<PathBuf>, ProjectError> {
        let global_config = self.global_config_path();
        info!("Generating config file from template at: {}", global_config.display());

        let template = self.bgcflow_dir.join(TEMPLATE_CONFIG);
        if !template.is_file() {
            return Err(ProjectError::MissingTemplate(template));
        }
        self.ensure_config_dir()?;
        std::fs::copy(&template, &global_config).map_err(|e| ProjectError::io(&template, e))?;

        let config = GlobalConfig::load(&global_config)?;
        let mut copied = Vec::new();
        for section in PROJECT_SECTIONS {
            for entry in config.entries(section).into_iter().filter(|e| e.is_pep_file()) {
                let pep_path = Path::new(&entry.name);
                let Some(example_name) = pep_path.parent().and_then(Path::file_name) else {
                    continue;
                };
                if entry.name.starts_with(".examples") {
                    warn!(
                        "You are using BGCFlow version <= 0.7.1. In the global config file (`{}`), please change the location of your `{}` to `config/{}/{}`.",
                        global_config.display(),
                        entry.name,
                        example_name.to_string_lossy(),
                        pep_path.file_name().unwrap_or_default().to_string_lossy(),
                    );
                }
                let source = self.bgcflow_dir.join(".examples").join(example_name);
                let target = self.config_dir().join(example_name);
                if target.exists() {
                    debug!("Example project already present at {}", target.display());
                    continue;
                }
                crate::fs::copy_dir_all(&source, &target)
                    .map_err(|e| ProjectError::Copy(format!("{e:#}")))?;
                copied.push(target);
            }
        }
        Ok(copied)
    }

    /// Create `config/<name>/project_config.yaml` and register it globally.
    ///
    /// The duplicate check runs before anything is written, so a rejected
    /// project leaves the checkout untouched.
    pub fn generate_project(&self, request: &NewProject) -> Result<PathBuf, ProjectError> {
        if !is_plain_name(&request.name) {
            return Err(ProjectError::InvalidName(request.name.clone()));
        }
        let global_config_path = self.global_config_path();
        if !global_config_path.is_file() {
            self.init()?;
        }

        debug!("Updating global config.yaml");
        let mut global_config = GlobalConfig::load(&global_config_path)?;
        global_config.normalize();

        let project_dir = self.project_dir(&request.name);
        let project_config_path = project_dir.join(PROJECT_CONFIG_FILE);
        let registered_as = project_config_path.to_string_lossy().to_string();
        if global_config.contains_project(&request.name) || global_config.contains_project(&registered_as) {
            return Err(ProjectError::ProjectExists {
                name: request.name.clone(),
                project_dir,
            });
        }

        let mut project_config = ProjectConfig::template(&request.name, &request.pep_version);
        if request.use_project_rules {
            let catalog = PipelineCatalog::load(&self.bgcflow_dir)?;
            project_config = project_config.with_rules_disabled(catalog.names());
        }

        std::fs::create_dir_all(&project_dir).map_err(|e| ProjectError::io(&project_dir, e))?;

        match &request.samples {
            Some(SampleSource::Records(records)) => {
                debug!("Generating samples file from {} records", records.len());
                pep::write_sample_table(records, &project_dir.join(SAMPLES_FILE))?;
            }
            Some(SampleSource::Csv(path)) => {
                debug!("Copying samples file from {}", path.display());
                copy_input(path, &project_dir.join(SAMPLES_FILE))?;
            }
            None => {}
        }

        if let Some(prokka_db) = &request.prokka_db {
            debug!("Copying custom annotation file from {}", prokka_db.display());
            copy_input(prokka_db, &project_dir.join(PROKKA_DB_FILE))?;
            project_config.prokka_db = PROKKA_DB_FILE.to_string();
        }

        if let Some(gtdb_tax) = &request.gtdb_tax {
            debug!("Copying custom taxonomy from {}", gtdb_tax.display());
            copy_input(gtdb_tax, &project_dir.join(GTDB_TAX_FILE))?;
            project_config.gtdb_tax = GTDB_TAX_FILE.to_string();
        }

        if let Some(description) = &request.description {
            debug!("Writing project description...");
            project_config.description = description.clone();
        }

        project_config.write(&project_config_path)?;
        info!("Project config file generated in: {}", project_dir.display());

        global_config.add_project(&registered_as);
        global_config.save(&global_config_path)?;
        Ok(project_config_path)
    }
}

/// A project name becomes a directory under `config/`, so it must be one path component.
fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.contains("..")
}

fn copy_input(source: &Path, destination: &Path) -> Result<(), ProjectError> {
    if !source.is_file() {
        return Err(ProjectError::MissingInput(source.to_path_buf()));
    }
    std::fs::copy(source, destination).map_err(|e| ProjectError::io(source, e))?;
    Ok(())
}
