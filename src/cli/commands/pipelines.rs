use super::{Command, MISSING_BGCFLOW_DIR};
use crate::workflows::{CatalogError, PipelineCatalog, PipelineInfo};
use anyhow::Result;
use std::fmt::Write as _;
use std::path::PathBuf;

pub struct PipelinesCommand {
    pub bgcflow_dir: PathBuf,
    pub describe: Option<String>,
    pub cite: Option<String>,
}

impl PipelinesCommand {
    pub fn new(bgcflow_dir: PathBuf, describe: Option<String>, cite: Option<String>) -> Self {
        Self {
            bgcflow_dir,
            describe,
            cite,
        }
    }

    /// Text printed for the requested view of the catalog.
    ///
    /// `--describe` and `--cite` can be combined; with neither, every
    /// pipeline name is listed.
    pub fn render(&self, catalog: &PipelineCatalog) -> Result<String, CatalogError> {
        let mut out = String::new();
        if self.describe.is_none() && self.cite.is_none() {
            out.push_str("Printing available rules:\n");
            for name in catalog.names() {
                let _ = writeln!(out, " - {name}");
            }
            return Ok(out);
        }

        let mut unknown: Vec<String> = Vec::new();
        for name in [&self.describe, &self.cite].into_iter().flatten() {
            if catalog.get(name).is_none() && !unknown.contains(name) {
                unknown.push(name.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(CatalogError::UnknownPipeline(unknown));
        }

        if let Some((name, info)) = lookup(catalog, &self.describe) {
            let _ = writeln!(out, "Description for {name}:");
            let _ = writeln!(out, " - {}", info.description);
        }
        if let Some((name, info)) = lookup(catalog, &self.cite) {
            let _ = writeln!(out, "Citations for {name}:");
            for reference in &info.references {
                let _ = writeln!(out, "- {reference}");
            }
        }
        Ok(out)
    }
}

fn lookup<'a>(catalog: &'a PipelineCatalog, name: &'a Option<String>) -> Option<(&'a str, &'a PipelineInfo)> {
    let name = name.as_deref()?;
    Some((name, catalog.get(name)?))
}

impl Command for PipelinesCommand {
    async fn execute(&self) -> Result<()> {
        let catalog = match PipelineCatalog::load(&self.bgcflow_dir) {
            Ok(catalog) => catalog,
            Err(e @ CatalogError::NotFound(_)) => {
                println!("{MISSING_BGCFLOW_DIR}");
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };
        print!("{}", self.render(&catalog)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
seqfu:
  description: Calculate sequence statistics using SeqFu.
  references:
    - "Telatin, A., et al. SeqFu."
antismash:
  description: Identify BGCs using antiSMASH.
  references:
    - "Blin, K., et al. antiSMASH 7.0."
    - "Medema, M. H., et al. MIBiG."
"#;

    fn command(describe: Option<&str>, cite: Option<&str>) -> PipelinesCommand {
        PipelinesCommand::new(
            PathBuf::from("."),
            describe.map(str::to_string),
            cite.map(str::to_string),
        )
    }

    #[test]
    fn test_lists_rules_in_file_order() {
        let catalog = PipelineCatalog::from_yaml(RULES).unwrap();
        let out = command(None, None).render(&catalog).unwrap();
        assert_eq!(out, "Printing available rules:\n - seqfu\n - antismash\n");
    }

    #[test]
    fn test_describe_and_cite_together() {
        let catalog = PipelineCatalog::from_yaml(RULES).unwrap();
        let out = command(Some("seqfu"), Some("antismash")).render(&catalog).unwrap();
        assert_eq!(
            out,
            "Description for seqfu:\n - Calculate sequence statistics using SeqFu.\n\
             Citations for antismash:\n- Blin, K., et al. antiSMASH 7.0.\n- Medema, M. H., et al. MIBiG.\n"
        );
    }

    #[test]
    fn test_unknown_pipeline() {
        let catalog = PipelineCatalog::from_yaml(RULES).unwrap();
        let err = command(Some("bigslice"), None).render(&catalog).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPipeline(names) if names == vec!["bigslice"]));
    }

    #[test]
    fn test_every_unknown_pipeline_is_named() {
        let catalog = PipelineCatalog::from_yaml(RULES).unwrap();

        let err = command(Some("bigslice"), Some("gecco")).render(&catalog).unwrap_err();
        assert!(matches!(&err, CatalogError::UnknownPipeline(names) if names == &vec!["bigslice", "gecco"]));
        assert!(err.to_string().contains("gecco"));

        let err = command(Some("seqfu"), Some("gecco")).render(&catalog).unwrap_err();
        assert!(matches!(err, CatalogError::UnknownPipeline(names) if names == vec!["gecco"]));
    }
}
