//! File system helpers for scaffolding

use anyhow::{anyhow, Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `source` into `target`, creating `target`.
///
/// Fails if `target` already exists.
pub fn copy_dir_all(source: &Path, target: &Path) -> Result<()> {
    if !source.is_dir() {
        return Err(anyhow!("Source directory {} does not exist", source.display()));
    }
    if target.exists() {
        return Err(anyhow!("Target {} already exists", target.display()));
    }

    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {}", source.display()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .with_context(|| format!("{} is outside {}", entry.path().display(), source.display()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&destination)
                .with_context(|| format!("Failed to create {}", destination.display()))?;
        } else {
            std::fs::copy(entry.path(), &destination).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    entry.path().display(),
                    destination.display()
                )
            })?;
        }
    }
    Ok(())
}
