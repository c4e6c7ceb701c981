//! Annotation file discovery.
//!
//! An annotation file is any regular file under the corpus root whose path,
//! relative to the root, matches one of the include globs (by default
//! `**/*.ann`) and none of the exclude globs. Version-control metadata
//! under `.git/` is always skipped. Results are sorted by path so corpus
//! order does not depend on the filesystem.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files under a corpus root count as annotation files.
#[derive(Debug, Clone)]
pub struct DiscoverOptions {
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

impl DiscoverOptions {
    /// Every file with the given extension, at any depth.
    pub fn for_extension(extension: &str) -> Self {
        Self {
            include_globs: vec![format!("**/*.{}", extension)],
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        Self::for_extension("ann")
    }
}

/// Recursively collect annotation files under `root`, sorted by path.
pub fn annotation_files(root: &Path, options: &DiscoverOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }

    let include_set = build_globset(&options.include_globs)?;

    let mut excludes = vec!["**/.git/**".to_string()];
    excludes.extend(options.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(options.follow_symlinks) {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if include_set.is_match(relative) && !exclude_set.is_match(relative) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    tracing::debug!(root = %root.display(), files = files.len(), "discovered annotation files");

    Ok(files)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
