//! Project traversal: find the source files eligible for scanning.
//!
//! The walk prunes excluded directories, applies include prefixes, skips
//! files with unrecognized extensions, and returns the survivors sorted by
//! relative path. The sorted order is what makes trail promotion
//! reproducible across runs.

use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::languages::LanguageRegistry;

/// One eligible file: its absolute path and the path relative to the
/// project root (forward slashes, no leading separator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub rel_path: String,
}

/// Compile exclude patterns up front so a bad pattern fails the run early.
pub fn compile_excludes(patterns: &[String]) -> anyhow::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| anyhow::anyhow!("failed to parse exclude regex {:?}: {}", p, e))
        })
        .collect()
}

fn is_excluded(rel_path: &str, excludes: &[Regex]) -> bool {
    excludes.iter().any(|rx| rx.is_match(rel_path))
}

fn is_included(rel_path: &str, includes: &[String]) -> bool {
    if includes.is_empty() {
        return true;
    }
    includes
        .iter()
        .any(|p| p == "..." || rel_path.starts_with(p.as_str()))
}

fn relative_to(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let rel = rel.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        rel.into_owned()
    } else {
        rel.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Walk the project directory and collect the files to scan.
///
/// Excluded directories are pruned whole; files whose extension has no
/// language definition are skipped silently, as are files outside the
/// include prefixes. The result is sorted by relative path.
pub fn collect_source_files(
    root: &Path,
    includes: &[String],
    excludes: &[Regex],
    registry: &LanguageRegistry,
) -> anyhow::Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    let mut walker = WalkDir::new(root).follow_links(true).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        let rel_path = relative_to(root, entry.path());

        if entry.file_type().is_dir() {
            if !rel_path.is_empty() && is_excluded(&rel_path, excludes) {
                walker.skip_current_dir();
            }
            continue;
        }
        if is_excluded(&rel_path, excludes) || !is_included(&rel_path, includes) {
            continue;
        }

        let ext = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        if registry.lookup(ext).is_none() {
            continue;
        }

        files.push(SourceFile {
            path: entry.path().to_path_buf(),
            rel_path,
        });
    }

    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(files)
}
