use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Snakefiles shipped under `workflow/` in a BGCFlow checkout
pub const KNOWN_WORKFLOWS: &[(&str, &str)] = &[
    ("Snakefile", "Main BGCFlow snakefile for genome mining"),
    ("BGC", "Subworkflow for comparative analysis of BGCs"),
    ("Report", "Build a static html report of a BGCFlow run"),
    ("Database", "Build a DuckDB database for a BGCFlow run"),
    ("Metabase", "Run a metabase server for visual exploration of the DuckDB database"),
    (
        "lsabgc",
        "Run population genetic and evolutionary analysis with lsaBGC-Easy.py using BiG-SCAPE output",
    ),
    (
        "ppanggolin",
        "Build pangenome graph and detect region of genome plasticity with PPanGGOLiN",
    ),
];

#[derive(Debug, Error)]
#[error("Snakefile {} does not exist. Available workflows are:\n{}", .path.display(), AvailableWorkflows)]
pub struct SnakefileNotFound {
    pub path: PathBuf,
}

struct AvailableWorkflows;

impl fmt::Display for AvailableWorkflows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = KNOWN_WORKFLOWS
            .iter()
            .map(|(name, description)| format!(" - {name}: {description}"))
            .collect();
        write!(f, "{}", lines.join("\n"))
    }
}

/// Map a `--workflow` value to a path inside the BGCFlow directory.
///
/// A bare known name such as `BGC` means `workflow/BGC`; anything else is taken
/// relative to the BGCFlow directory.
pub fn snakefile_path(bgcflow_dir: &Path, workflow: &str) -> PathBuf {
    if KNOWN_WORKFLOWS.iter().any(|(name, _)| *name == workflow) {
        bgcflow_dir.join("workflow").join(workflow)
    } else {
        bgcflow_dir.join(workflow)
    }
}

pub fn resolve_snakefile(bgcflow_dir: &Path, workflow: &str) -> Result<PathBuf, SnakefileNotFound> {
    let path = snakefile_path(bgcflow_dir, workflow);
    if path.is_file() {
        Ok(path)
    } else {
        Err(SnakefileNotFound { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_bare_and_prefixed_names_resolve_to_same_file() {
        let base = Path::new("/bgcflow");
        assert_eq!(snakefile_path(base, "BGC"), PathBuf::from("/bgcflow/workflow/BGC"));
        assert_eq!(snakefile_path(base, "workflow/BGC"), PathBuf::from("/bgcflow/workflow/BGC"));
        assert_eq!(
            snakefile_path(base, "custom/Snakefile"),
            PathBuf::from("/bgcflow/custom/Snakefile")
        );
    }

    #[test]
    fn test_missing_snakefile_lists_known_workflows() {
        let temp = TempDir::new().unwrap();
        let err = resolve_snakefile(temp.path(), "Snakefile").unwrap_err();
        let message = err.to_string();

        assert!(message.contains("does not exist"));
        assert!(message.contains(" - Snakefile: Main BGCFlow snakefile for genome mining"));
        assert!(message.contains(" - ppanggolin:"));
    }

    #[test]
    fn test_existing_snakefile_resolves() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("workflow")).unwrap();
        fs::write(temp.path().join("workflow/Report"), "rule all:\n").unwrap();

        let path = resolve_snakefile(temp.path(), "Report").unwrap();
        assert_eq!(path, temp.path().join("workflow/Report"));
    }
}
