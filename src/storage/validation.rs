//! Path validation
//!
//! Resolves caller-supplied logical paths against the sandbox root. Both the
//! root and every candidate are canonicalized on each call, so symlinks are
//! followed before the containment check is made. Nothing is cached between
//! calls; a path may still change between resolution and use (TOCTOU), which
//! is an accepted limitation of this server.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// A canonical physical path known to lie inside the sandbox root.
///
/// Only this module can construct one, so file operations cannot be handed a
/// path that skipped resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    path: PathBuf,
    logical: String,
}

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.path
    }

    /// Normalized root-relative form, used in messages and logs.
    pub fn logical(&self) -> &str {
        &self.logical
    }

    /// Logical form for display, with the root shown as `/`.
    pub fn display_logical(&self) -> String {
        format!("/{}", self.logical)
    }

    fn child_logical(&self, name: &str) -> String {
        if self.logical.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.logical, name)
        }
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Resolves logical paths inside a fixed root directory.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Configured root, as given at construction.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a logical path to an existing entry inside the root.
    ///
    /// The empty string and `/` both resolve to the root itself.
    pub fn resolve(&self, logical: &str) -> Result<ResolvedPath, StorageError> {
        let segments = split_logical_path(logical)?;
        let root = self.canonical_root()?;

        let mut candidate = root.clone();
        candidate.extend(&segments);

        let canonical = match fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(e) if is_missing(&e) => {
                // Report an escape even when the final entry is missing.
                self.check_existing_ancestor(&root, &candidate, logical)?;
                return Err(StorageError::NotFound(logical.to_string()));
            }
            Err(e) => return Err(StorageError::from(e)),
        };

        ensure_contained(&root, &canonical, logical)?;

        Ok(ResolvedPath {
            path: canonical,
            logical: segments.join("/"),
        })
    }

    /// Resolve `logical_dir` as a directory, then `name` as a single entry in it.
    pub fn resolve_name(
        &self,
        logical_dir: &str,
        name: &str,
    ) -> Result<ResolvedPath, StorageError> {
        let dir = self.resolve(logical_dir)?;
        if !dir.as_path().is_dir() {
            return Err(StorageError::NotADirectory(dir.display_logical()));
        }
        self.resolve_child(&dir, name)
    }

    /// Join a single validated `name` onto an already resolved directory.
    ///
    /// The returned path names the entry itself. If that entry is an existing
    /// symlink, its target must stay inside the root; dangling links are
    /// rejected as well.
    pub fn resolve_child(
        &self,
        dir: &ResolvedPath,
        name: &str,
    ) -> Result<ResolvedPath, StorageError> {
        validate_name(name)?;
        let logical = dir.child_logical(name);
        let root = self.canonical_root()?;
        ensure_contained(&root, dir.as_path(), &logical)?;

        let candidate = dir.as_path().join(name);
        match fs::symlink_metadata(&candidate) {
            Ok(meta) if meta.file_type().is_symlink() => match fs::canonicalize(&candidate) {
                Ok(target) => ensure_contained(&root, &target, &logical)?,
                Err(_) => return Err(StorageError::PathEscape(logical)),
            },
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(StorageError::from(e)),
        }

        Ok(ResolvedPath {
            path: candidate,
            logical,
        })
    }

    /// Whether `path` canonicalizes to somewhere inside the root.
    pub fn contains(&self, path: &Path) -> bool {
        match (self.canonical_root(), fs::canonicalize(path)) {
            (Ok(root), Ok(target)) => target.starts_with(&root),
            _ => false,
        }
    }

    fn canonical_root(&self) -> Result<PathBuf, StorageError> {
        fs::canonicalize(&self.root).map_err(StorageError::from)
    }

    fn check_existing_ancestor(
        &self,
        root: &Path,
        candidate: &Path,
        logical: &str,
    ) -> Result<(), StorageError> {
        for ancestor in candidate.ancestors().skip(1) {
            if let Ok(existing) = fs::canonicalize(ancestor) {
                return ensure_contained(root, &existing, logical);
            }
        }
        Ok(())
    }
}

/// Split a logical path into plain segments.
///
/// Empty and `.` segments are dropped, which also makes a leading `/`
/// root-relative. `..`, NUL bytes, backslashes and anything the platform
/// would parse as more than one ordinary component are rejected.
pub fn split_logical_path(logical: &str) -> Result<Vec<&str>, StorageError> {
    let mut segments = Vec::new();
    for segment in logical.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if !is_plain_segment(segment) {
            return Err(StorageError::PathEscape(logical.to_string()));
        }
        segments.push(segment);
    }
    Ok(segments)
}

/// Validate a bare entry name: exactly one non-empty plain segment.
pub fn validate_name(name: &str) -> Result<&str, StorageError> {
    if name.is_empty() || name == "." || name.contains('/') || !is_plain_segment(name) {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(name)
}

fn is_plain_segment(segment: &str) -> bool {
    if segment == ".." || segment.contains('\0') || segment.contains('\\') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == OsStr::new(segment)
    )
}

/// Containment by whole path components, so `/data-evil` is not inside `/data`.
fn ensure_contained(root: &Path, candidate: &Path, logical: &str) -> Result<(), StorageError> {
    if candidate.starts_with(root) {
        Ok(())
    } else {
        Err(StorageError::PathEscape(logical.to_string()))
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
