//! The allowed root and path confinement.
//!
//! Every path a tool receives is resolved here before anything touches the
//! filesystem. Relative paths are joined to the root, then canonicalized so
//! `..` and symlinks cannot escape it.

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// The directory tree the server is allowed to read.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Confine the server to `root`.
    ///
    /// # Errors
    ///
    /// Returns `Error::RootNotFound` if `root` does not exist or is not a directory.
    pub fn new(root: &Path) -> Result<Self> {
        let canonical = root.canonicalize().map_err(|e| Error::RootNotFound {
            path: root.display().to_string(),
            source: Some(e),
        })?;
        if !canonical.is_dir() {
            return Err(Error::RootNotFound {
                path: root.display().to_string(),
                source: None,
            });
        }
        debug!(root = %canonical.display(), "Workspace root set");
        Ok(Self { root: canonical })
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a requested path to a canonical path inside the root.
    ///
    /// The file need not exist (inline content may name a new file), but its
    /// nearest existing ancestor must resolve inside the root.
    ///
    /// # Errors
    ///
    /// Returns `Error::AccessDenied` if the path escapes the root or contains
    /// invalid characters.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let denied = || Error::AccessDenied {
            path: requested.to_string(),
            root: self.root.display().to_string(),
        };
        if requested.is_empty() || requested.contains('\0') {
            return Err(denied());
        }

        let candidate = Path::new(requested);
        let joined = if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.root.join(candidate)
        };

        let resolved = canonicalize_existing_prefix(&joined).ok_or_else(denied)?;
        if resolved.starts_with(&self.root) {
            Ok(resolved)
        } else {
            debug!(path = requested, resolved = %resolved.display(), "Rejected path outside root");
            Err(denied())
        }
    }
}

/// Canonicalize the longest existing prefix of `path` and append the rest.
///
/// Returns `None` if the non-existent remainder contains anything but plain
/// names, since `..` there cannot be resolved safely.
fn canonicalize_existing_prefix(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Some(canonical);
    }

    let mut missing = Vec::new();
    let mut current = path;
    loop {
        let name = current.file_name()?;
        missing.push(name.to_os_string());
        current = current.parent()?;
        if let Ok(base) = current.canonicalize() {
            let mut resolved = base;
            for part in missing.iter().rev() {
                resolved.push(part);
            }
            return resolved
                .components()
                .all(|c| !matches!(c, Component::ParentDir | Component::CurDir))
                .then_some(resolved);
        }
    }
}
