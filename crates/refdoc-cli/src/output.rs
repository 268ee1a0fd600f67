//! Writing rendered output to disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use refdoc_core::TransformOutput;
use tracing::info;

use crate::docfx;

/// Write one file per page plus `index.yml` and `toc.yml`
///
/// # Errors
///
/// Returns an error if the directory cannot be created, a file cannot be
/// written or rendering fails.
pub fn write_output(output: &TransformOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;

    let mut written = Vec::with_capacity(output.pages.len() + 2);
    for page in &output.pages {
        let yaml = docfx::render_reference(&docfx::page_file(page))
            .with_context(|| format!("Failed to render page '{}'", page.uid))?;
        written.push(write_file(dir, &page.href, &yaml)?);
    }

    let index = docfx::render_reference(&docfx::index_file(&output.packages))
        .context("Failed to render package index")?;
    written.push(write_file(dir, "index.yml", &index)?);

    let toc = docfx::render_toc(&output.toc).context("Failed to render toc")?;
    written.push(write_file(dir, "toc.yml", &toc)?);

    Ok(written)
}

fn write_file(dir: &Path, name: &str, content: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    info!(path = %path.display(), "wrote");
    Ok(path)
}
