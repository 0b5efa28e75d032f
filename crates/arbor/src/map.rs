//! Codebase maps: outlines for every supported file under a directory.
//!
//! Discovery skips hidden entries and common build output. Per-file
//! problems (unreadable, not UTF-8, syntax errors) are collected as
//! [`FileError`]s and never stop the walk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

use crate::error::{FileError, FileErrorKind};
use crate::types::{meta, Language, Outline, SymbolKind, Truncation};

/// Directory names never descended into.
pub const EXCLUDED_DIRS: &[&str] = &[
    "target",
    "node_modules",
    "vendor",
    "bin",
    "obj",
    "build",
    "dist",
    "__pycache__",
];

/// Outline of one file in a map.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    /// Path relative to the mapped root
    pub path: PathBuf,
    /// Grammar used
    pub language: Language,
    /// Extracted outline
    pub outline: Outline,
    /// Number of syntax errors in the file
    pub syntax_errors: usize,
    /// Budgets exceeded while analyzing the file
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub truncated: Vec<Truncation>,
}

/// Totals across a map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapStats {
    /// Files parsed and outlined
    pub files_analyzed: usize,
    /// Per-file errors collected
    pub errors: usize,
    /// Class-like symbols
    pub classes: usize,
    /// Functions and methods
    pub functions: usize,
    /// Functions and methods carrying decorators or attributes
    pub decorated_functions: usize,
}

/// Result of [`crate::Analyzer::map_directory`].
#[derive(Debug, Clone, Serialize)]
pub struct CodebaseMap {
    /// Directory that was mapped
    pub root: PathBuf,
    /// Analyzed files, sorted by path
    pub files: Vec<FileSummary>,
    /// Problems with individual files
    pub errors: Vec<FileError>,
}

impl CodebaseMap {
    /// Compute totals over the files and errors.
    #[must_use]
    pub fn stats(&self) -> MapStats {
        let mut stats = MapStats {
            files_analyzed: self.files.len(),
            errors: self.errors.len(),
            ..MapStats::default()
        };
        for file in &self.files {
            for (symbol, _) in file.outline.flatten() {
                match symbol.kind {
                    SymbolKind::Class => stats.classes += 1,
                    SymbolKind::Function | SymbolKind::Method => {
                        stats.functions += 1;
                        if !symbol.meta_list(meta::DECORATORS).is_empty() {
                            stats.decorated_functions += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
        stats
    }
}

/// Whether a directory name is skipped during discovery.
#[must_use]
pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

fn is_skipped(entry: &DirEntry, include_hidden: bool) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let Some(name) = entry.file_name().to_str() else {
        return false;
    };
    if !include_hidden && name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && is_excluded_dir(name)
}

/// Fail unless `root` is a readable directory.
pub(crate) fn require_dir(root: &Path) -> std::io::Result<()> {
    if std::fs::metadata(root)?.is_dir() {
        return Ok(());
    }
    Err(std::io::Error::new(
        std::io::ErrorKind::NotADirectory,
        format!("not a directory: {}", root.display()),
    ))
}

/// Every file under `root` in sorted order, plus entries that could not be read.
///
/// Build directories are always skipped. Hidden directories and files are
/// skipped unless `include_hidden` is set.
pub(crate) fn discover_files(root: &Path, include_hidden: bool) -> (Vec<PathBuf>, Vec<FileError>) {
    let mut files = Vec::new();
    let mut errors = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_skipped(e, include_hidden));

    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                warn!(path = %path.display(), error = %e, "Cannot read directory entry, skipping");
                errors.push(FileError::new(path, FileErrorKind::IoError, e.to_string()));
            }
        }
    }
    (files, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovery_skips_hidden_and_build_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        for sub in ["src", ".git", "target", "node_modules", "src/nested"] {
            fs::create_dir_all(root.join(sub)).expect("mkdir");
        }
        fs::write(root.join("src/b.py"), "x = 1\n").expect("write");
        fs::write(root.join("src/a.py"), "x = 1\n").expect("write");
        fs::write(root.join("src/nested/c.rs"), "fn c() {}\n").expect("write");
        fs::write(root.join(".git/config"), "").expect("write");
        fs::write(root.join("target/out.rs"), "").expect("write");
        fs::write(root.join("node_modules/m.js"), "").expect("write");

        let (files, errors) = discover_files(root, false);

        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).expect("under root").to_path_buf())
            .collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("src/a.py"),
                PathBuf::from("src/b.py"),
                PathBuf::from("src/nested/c.rs"),
            ]
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn hidden_root_is_still_walked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join(".project");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("main.go"), "package main\n").expect("write");

        let (files, _) = discover_files(&root, false);

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn hidden_entries_are_walked_on_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join(".config")).expect("mkdir");
        fs::create_dir_all(root.join("target")).expect("mkdir");
        fs::write(root.join(".env"), "KEY=1\n").expect("write");
        fs::write(root.join(".config/app.toml"), "").expect("write");
        fs::write(root.join("target/out.rs"), "").expect("write");
        fs::write(root.join("main.py"), "").expect("write");

        let (hidden_skipped, _) = discover_files(root, false);
        let (with_hidden, _) = discover_files(root, true);

        assert_eq!(hidden_skipped, vec![root.join("main.py")]);
        assert_eq!(
            with_hidden,
            vec![root.join(".config/app.toml"), root.join(".env"), root.join("main.py")]
        );
    }

    #[test]
    fn excluded_names() {
        assert!(is_excluded_dir("__pycache__"));
        assert!(!is_excluded_dir("src"));
    }
}
