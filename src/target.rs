//! Target-tree validation: the pipeline checks one fixed directory and never
//! creates or removes it.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::warn;
use walkdir::WalkDir;

use crate::pipeline::commands::EXCLUDED_DIRS;

/// Name of the directory tree every pipeline step operates on.
pub const TARGET_DIR: &str = "app";

/// Resolve the target tree under the invocation directory.
pub fn validate(root: &Path) -> Result<PathBuf> {
    let target = root.join(TARGET_DIR);
    if !target.is_dir() {
        bail!(
            "target directory not found: {} — run from the repository root",
            target.display()
        );
    }
    Ok(target)
}

/// Walk the target tree and list the Python sources the pipeline covers.
/// Returns a sorted list of paths relative to the target.
pub fn python_sources(target: &Path) -> Vec<String> {
    let mut sources = Vec::new();
    let walker = WalkDir::new(target)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("py")
            && let Ok(rel) = path.strip_prefix(target)
        {
            sources.push(rel.to_string_lossy().to_string());
        }
    }

    sources.sort();
    if sources.is_empty() {
        warn!(target = %target.display(), "no Python sources under target");
    }
    sources
}

fn should_skip(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_str().unwrap_or_default();
    name == ".git" || name == "__pycache__" || EXCLUDED_DIRS.contains(&name)
}
