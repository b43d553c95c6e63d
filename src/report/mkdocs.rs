//! Rendering the MkDocs site files for a project report

use super::metadata::ProjectMetadata;
use super::ReportError;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const MKDOCS_TEMPLATE: &str = include_str!("templates/mkdocs.yml");
const INDEX_TEMPLATE: &str = include_str!("templates/index.md");
const MACROS_TEMPLATE: &str = include_str!("templates/main.py");
const MAIN_HTML: &str = include_str!("templates/main.html");
const LOGO_SVG: &str = include_str!("assets/BGCFlow_logo.svg");

/// What to do when a generated file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Ask on the terminal
    Ask,
    Always,
    Never,
}

impl OverwritePolicy {
    fn allows(self, path: &Path) -> Result<bool, ReportError> {
        match self {
            OverwritePolicy::Always => Ok(true),
            OverwritePolicy::Never => Ok(false),
            OverwritePolicy::Ask => crate::prompt::confirm(&format!(
                "WARNING: {} already exists. Do you want to overwrite it?",
                path.display()
            ))
            .map_err(|e| ReportError::io(path, e)),
        }
    }
}

/// Page format the rule reports are published in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageFormat {
    Notebook,
    Markdown,
}

impl PageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            PageFormat::Notebook => "ipynb",
            PageFormat::Markdown => "md",
        }
    }
}

/// One navigation tab: a rule category and its `(rule, page)` entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavSection {
    pub category: String,
    pub pages: Vec<(String, String)>,
}

/// Group rules by category, categories in first-seen order.
pub fn navigation(metadata: &ProjectMetadata, format: PageFormat) -> Vec<NavSection> {
    let mut sections: Vec<NavSection> = Vec::new();
    for (rule, usage) in &metadata.rule_used {
        let page = format!("{rule}.{}", format.extension());
        debug!("Adding report [{rule} : {page}]");
        match sections.iter_mut().find(|s| s.category == usage.category) {
            Some(section) => section.pages.push((rule.clone(), page)),
            None => sections.push(NavSection {
                category: usage.category.clone(),
                pages: vec![(rule.clone(), page)],
            }),
        }
    }
    sections
}

fn string(value: &str) -> Value {
    Value::String(value.to_string())
}

pub fn mkdocs_config(sections: &[NavSection]) -> Result<String, serde_yaml::Error> {
    let mut config: Mapping = serde_yaml::from_str(MKDOCS_TEMPLATE)?;
    let nav = match config.get_mut("nav") {
        Some(Value::Sequence(nav)) => nav,
        _ => return Err(serde::de::Error::custom("mkdocs template has no nav list")),
    };
    for section in sections {
        let pages = section
            .pages
            .iter()
            .map(|(rule, page)| {
                let mut entry = Mapping::new();
                entry.insert(string(rule), string(page));
                Value::Mapping(entry)
            })
            .collect();
        let mut entry = Mapping::new();
        entry.insert(string(&section.category), Value::Sequence(pages));
        nav.push(Value::Mapping(entry));
    }
    serde_yaml::to_string(&config)
}

/// Markdown pipe table of the rules used, linking each rule page.
pub fn rule_table(metadata: &ProjectMetadata) -> String {
    let header = ["BGCFlow_rules", "description"];
    let rows: Vec<[String; 2]> = metadata
        .rule_used
        .iter()
        .map(|(rule, usage)| {
            [
                format!("[{rule}]({rule}/){{.md-button}}"),
                usage.description.replace('|', "\\|"),
            ]
        })
        .collect();

    let mut widths = header.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 2]| {
        format!(
            "| {:<w0$} | {:<w1$} |",
            cells[0],
            cells[1],
            w0 = widths[0],
            w1 = widths[1]
        )
    };
    let mut table = vec![
        line(header),
        format!("|:{}|:{}|", "-".repeat(widths[0] + 1), "-".repeat(widths[1] + 1)),
    ];
    table.extend(rows.iter().map(|row| line([row[0].as_str(), row[1].as_str()])));
    table.join("\n")
}

pub fn index_page(metadata: &ProjectMetadata) -> String {
    INDEX_TEMPLATE.replace("{{ rule_table }}", &rule_table(metadata))
}

pub fn macros_module(file_server: &str) -> String {
    MACROS_TEMPLATE.replace("{{ file_server }}", file_server)
}

#[derive(Debug, Default)]
pub struct GeneratedSite {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Writes the MkDocs project into a report directory
pub struct SiteWriter {
    report_dir: PathBuf,
    policy: OverwritePolicy,
}

impl SiteWriter {
    pub fn new(report_dir: impl Into<PathBuf>, policy: OverwritePolicy) -> Self {
        Self {
            report_dir: report_dir.into(),
            policy,
        }
    }

    pub fn write(
        &self,
        metadata: &ProjectMetadata,
        file_server: &str,
        format: PageFormat,
    ) -> Result<GeneratedSite, ReportError> {
        let mut site = GeneratedSite::default();

        info!("Preparing mkdocs config...");
        let mkdocs_yml = self.report_dir.join("mkdocs.yml");
        let config = mkdocs_config(&navigation(metadata, format))
            .map_err(|e| ReportError::yaml(&mkdocs_yml, e))?;
        info!("Generating mkdocs config at: {}", mkdocs_yml.display());
        self.write_guarded(&mkdocs_yml, &config, &mut site)?;

        let docs_dir = self.report_dir.join("docs");
        create_dir(&docs_dir)?;
        let index = docs_dir.join("index.md");
        info!("Generating homepage at: {}", index.display());
        self.write_guarded(&index, &index_page(metadata), &mut site)?;

        let macros = self.report_dir.join("main.py");
        info!("Generating python macros at: {}", macros.display());
        self.write_guarded(&macros, &macros_module(file_server), &mut site)?;

        // Theme override and logo are always refreshed
        let override_dir = self.report_dir.join("overrides");
        create_dir(&override_dir)?;
        let main_html = override_dir.join("main.html");
        info!("Extends main html: {}", main_html.display());
        write_file(&main_html, MAIN_HTML)?;
        site.written.push(main_html);

        let asset_dir = docs_dir.join("assets").join("bgcflow");
        create_dir(&asset_dir)?;
        info!("Generating assets...");
        let logo = asset_dir.join("BGCFlow_logo.svg");
        write_file(&logo, LOGO_SVG)?;
        site.written.push(logo);

        Ok(site)
    }

    fn write_guarded(
        &self,
        path: &Path,
        contents: &str,
        site: &mut GeneratedSite,
    ) -> Result<(), ReportError> {
        if path.exists() && !self.policy.allows(path)? {
            println!("Skipping file write.");
            site.skipped.push(path.to_path_buf());
            return Ok(());
        }
        write_file(path, contents)?;
        site.written.push(path.to_path_buf());
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ReportError> {
    std::fs::create_dir_all(path).map_err(|e| ReportError::io(path, e))
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    std::fs::write(path, contents).map_err(|e| ReportError::io(path, e))
}
