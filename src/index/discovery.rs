//! Source file discovery across several roots.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::core::config::ScanConfig;

/// Collect every candidate source file under `roots`.
///
/// The result is sorted and free of duplicates so that downstream merges are
/// independent of traversal order. Missing roots and unreadable directory
/// entries are logged and skipped.
pub fn discover_files(roots: &[PathBuf], config: &ScanConfig) -> Vec<PathBuf> {
    let skip_dirs: HashSet<String> = config
        .skip_dirs
        .iter()
        .map(|d| d.to_ascii_lowercase())
        .collect();

    let mut collected = Vec::new();
    for root in roots {
        if !root.exists() {
            warn!("Source root does not exist: {}", root.display());
            continue;
        }
        if root.is_file() {
            if should_keep(root, config) {
                collected.push(root.clone());
            }
            continue;
        }
        walk_root(root, config, &skip_dirs, &mut collected);
    }

    collected.sort();
    collected.dedup();
    info!(
        "Discovered {} source files across {} roots",
        collected.len(),
        roots.len()
    );
    collected
}

fn walk_root(
    root: &Path,
    config: &ScanConfig,
    skip_dirs: &HashSet<String>,
    collected: &mut Vec<PathBuf>,
) {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_skipped_dir(entry, skip_dirs));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if entry.file_type().is_file() && should_keep(entry.path(), config) {
            collected.push(entry.into_path());
        }
    }
}

fn is_skipped_dir(entry: &DirEntry, skip_dirs: &HashSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|name| skip_dirs.contains(&name.to_ascii_lowercase()))
            .unwrap_or(false)
}

fn should_keep(path: &Path, config: &ScanConfig) -> bool {
    if !config.accepts_extension(path) {
        return false;
    }
    match path.metadata() {
        Ok(meta) => meta.len() <= config.max_file_size_bytes,
        Err(err) => {
            warn!("Cannot stat {}: {}", path.display(), err);
            false
        }
    }
}
