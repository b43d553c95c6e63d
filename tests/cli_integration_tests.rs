//! End-to-end CLI integration tests
//!
//! These tests drive the bgcflow binary against a scratch BGCFlow checkout
//! without calling Snakemake or any other external tool.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs::{create_dir_all, write};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const RULES: &str = r#"seqfu:
  description: Calculate sequence statistics using SeqFu.
  references:
    - "Telatin, A., et al. SeqFu: A Suite of Utilities for the Robust and Reproducible Manipulation of Sequence Files."
mash:
  description: Calculate distance estimation for genomes using MASH.
  references:
    - "Ondov, B. D., et al. Mash: fast genome and metagenome distance estimation using MinHash."
"#;

const CONFIG_TEMPLATE: &str = r#"projects:
  - name: mq_saccharopolyspora
    samples: config/examples/_genome_project_example/samples.csv
rules:
  seqfu: TRUE
  mash: TRUE
"#;

/// Helper for setting up a BGCFlow checkout to run the binary in
pub struct CheckoutEnvironment {
    pub temp_dir: TempDir,
}

impl CheckoutEnvironment {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();

        create_dir_all(root.join("workflow"))?;
        write(root.join("workflow/rules.yaml"), RULES)?;
        create_dir_all(root.join(".examples"))?;
        write(root.join(".examples/_config_example.yaml"), CONFIG_TEMPLATE)?;

        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn add_results(&self, project: &str, items: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
        let processed = self.path().join("data/processed").join(project);
        for item in items {
            create_dir_all(processed.join(item))?;
        }
        Ok(())
    }

    /// The binary, run from inside the checkout
    pub fn bgcflow(&self) -> Command {
        let mut cmd = Command::cargo_bin("bgcflow").unwrap();
        cmd.current_dir(self.path()).env("RUST_LOG", "warn");
        cmd
    }
}

#[test]
fn test_pipelines_lists_rules_in_order() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .arg("pipelines")
        .assert()
        .success()
        .stdout(predicate::str::contains("Printing available rules:\n - seqfu\n - mash\n"));
}

#[test]
fn test_pipelines_describe_and_cite() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .args(["pipelines", "--describe", "mash", "--cite", "seqfu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Description for mash:"))
        .stdout(predicate::str::contains(" - Calculate distance estimation"))
        .stdout(predicate::str::contains("Citations for seqfu:"))
        .stdout(predicate::str::contains("- Telatin, A., et al."));
}

#[test]
fn test_pipelines_unknown_rule_fails() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .args(["pipelines", "--describe", "bigslice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bigslice"))
        .stderr(predicate::str::contains("bgcflow pipelines"));
}

#[test]
fn test_pipelines_outside_checkout_prints_guidance() {
    let empty = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("bgcflow").unwrap();

    cmd.arg("pipelines")
        .arg("--bgcflow_dir")
        .arg(empty.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("Cannot find BGCFlow directory"))
        .stdout(predicate::str::contains("bgcflow clone <destination>"));
}

#[test]
fn test_init_generates_then_lists_projects() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated config file in:"))
        .stdout(predicate::str::contains("bgcflow run -n"));
    assert!(env.path().join("config/config.yaml").is_file());

    env.bgcflow()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Available projects:"))
        .stdout(predicate::str::contains(
            " - mq_saccharopolyspora : config/examples/_genome_project_example/samples.csv",
        ));
}

#[test]
fn test_init_project_with_samples() {
    let env = CheckoutEnvironment::new().unwrap();
    let samples = env.path().join("my_samples.csv");
    write(&samples, "genome_id,source,organism,genus,species,strain,closest_placement_reference,input_file\n").unwrap();

    env.bgcflow()
        .args(["init", "--project", "demo", "--samples_csv"])
        .arg(&samples)
        .assert()
        .success()
        .stdout(predicate::str::contains("Project demo generated"));

    let project_dir = env.path().join("config/demo");
    assert!(project_dir.join("project_config.yaml").is_file());
    assert!(project_dir.join("samples.csv").is_file());

    let global = std::fs::read_to_string(env.path().join("config/config.yaml")).unwrap();
    assert!(global.contains("demo/project_config.yaml"));

    env.bgcflow()
        .args(["init", "--project", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_get_result_lists_items() {
    let env = CheckoutEnvironment::new().unwrap();
    env.add_results("demo", &["antismash", "seqfu"]).unwrap();

    env.bgcflow()
        .args(["get-result", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Available items from"))
        .stdout(predicate::str::contains(" - antismash\n - seqfu\n"))
        .stdout(predicate::str::contains("Use --copy <DESTINATION>"));
}

#[test]
fn test_get_result_missing_project() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .args(["get-result", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot find project [ghost] results"));
}

#[test]
fn test_run_missing_snakefile_lists_workflows() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .args(["run", "--monitor-off", "-n", "--workflow", "BGC"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist. Available workflows are:"))
        .stderr(predicate::str::contains(" - lsabgc:"));
}

#[test]
fn test_serve_without_project_prints_guidance() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .arg("serve")
        .assert()
        .success()
        .stdout(predicate::str::contains("bgcflow serve --project <project name>"))
        .stdout(predicate::str::contains("bgcflow serve --project snakemake_report"));
}

#[test]
fn test_serve_report_without_results_fails() {
    let env = CheckoutEnvironment::new().unwrap();

    env.bgcflow()
        .args(["serve", "--project", "demo", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR:"));
}
