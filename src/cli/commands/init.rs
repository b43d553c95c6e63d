use super::{Command, MISSING_BGCFLOW_DIR};
use crate::projects::{InitOutcome, NewProject, ProjectError, ProjectScaffolder, SampleSource};
use anyhow::Result;
use std::path::PathBuf;

pub struct InitCommand {
    pub bgcflow_dir: PathBuf,
    pub project: Option<String>,
    pub use_project_pipeline: bool,
    pub prokka_db: Option<PathBuf>,
    pub gtdb_tax: Option<PathBuf>,
    pub samples_csv: Option<PathBuf>,
}

impl InitCommand {
    fn new_project(&self, name: &str) -> NewProject {
        let mut request = NewProject::new(name);
        request.use_project_rules = self.use_project_pipeline;
        request.samples = self.samples_csv.clone().map(SampleSource::Csv);
        request.prokka_db = self.prokka_db.clone();
        request.gtdb_tax = self.gtdb_tax.clone();
        request
    }

    fn run(&self) -> Result<(), ProjectError> {
        let scaffolder = ProjectScaffolder::new(&self.bgcflow_dir)?;
        match &self.project {
            Some(name) => {
                let project_dir = scaffolder.generate_project(&self.new_project(name))?;
                println!("Project {name} generated in {}", project_dir.display());
            }
            None => match scaffolder.init()? {
                InitOutcome::Existing(projects) => {
                    println!("Available projects:");
                    for project in projects {
                        println!(" - {} : {}", project.name, project.sample_table);
                    }
                }
                InitOutcome::Generated(copied) => {
                    println!(
                        "Generated config file in: {}",
                        scaffolder.global_config_path().display()
                    );
                    for dir in copied {
                        println!(" - copied example project {}", dir.display());
                    }
                }
            },
        }
        println!("\nDo a test run by: `bgcflow run -n`");
        Ok(())
    }
}

impl Command for InitCommand {
    async fn execute(&self) -> Result<()> {
        match self.run() {
            Ok(()) => Ok(()),
            Err(e) if e.is_missing_bgcflow_dir() => {
                println!("{MISSING_BGCFLOW_DIR}");
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
