//! Storage operations
//!
//! Handles the file manager's filesystem operations: list, download, upload,
//! mkdir, rename and delete. Every call takes paths already produced by the
//! `PathResolver` and performs its own existence/type checks. All calls block
//! and must be run off the async executor.

use log::{debug, error, info};
use std::fs::{self, Metadata};
use std::io::{self, Read};

use crate::error::StorageError;
use crate::error::handlers::handle_error;
use crate::storage::filesystem::{
    directory_has_entries, entry_exists, modified_secs, retry_on_permission_denied, write_durably,
};
use crate::storage::results::{Download, Entry, UploadOutcome};
use crate::storage::validation::{PathResolver, ResolvedPath};

/// Filesystem operations confined to one sandbox root
#[derive(Debug, Clone)]
pub struct FileOps {
    resolver: PathResolver,
}

impl FileOps {
    pub fn new(resolver: PathResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Lists the contents of a directory in enumeration order.
    ///
    /// Symlinks whose targets leave the root, or that dangle, are left out.
    pub fn list(&self, dir: &ResolvedPath) -> Result<Vec<Entry>, StorageError> {
        ensure_directory(dir)?;

        let read_dir = retry_on_permission_denied(|| fs::read_dir(dir.as_path())).map_err(|e| {
            error!("Failed to list directory {}: {}", dir.display_logical(), e);
            StorageError::from(e)
        })?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();

            let metadata = if entry.file_type()?.is_symlink() {
                if !self.resolver.contains(&path) {
                    debug!("Hiding symlink {:?} in {}", name, dir.display_logical());
                    continue;
                }
                fs::metadata(&path)
            } else {
                entry.metadata()
            };

            match metadata {
                Ok(metadata) => entries.push(Entry::from_metadata(name, &metadata)),
                // Removed while we were listing.
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(StorageError::from(e)),
            }
        }

        info!(
            "Listed directory {} - {} entries",
            dir.display_logical(),
            entries.len()
        );
        Ok(entries)
    }

    /// Prepares a file for download.
    pub fn download(&self, file: &ResolvedPath) -> Result<Download, StorageError> {
        let metadata = stat(file)?;
        if metadata.is_dir() {
            return Err(StorageError::IsADirectory(file.display_logical()));
        }

        let file_name = file
            .logical()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();

        info!("Prepared download of {}", file.display_logical());
        Ok(Download {
            path: file.clone(),
            file_name,
            size: metadata.len(),
            modified: modified_secs(&metadata),
        })
    }

    /// Stores several files in `dir`, each independently.
    ///
    /// Only a missing or non-directory target fails the whole call; per-file
    /// failures are reported in the returned outcomes, in input order.
    pub fn upload<R: Read>(
        &self,
        dir: &ResolvedPath,
        files: Vec<(String, R)>,
    ) -> Result<Vec<UploadOutcome>, StorageError> {
        ensure_directory(dir)?;

        let outcomes = files
            .into_iter()
            .map(|(name, mut reader)| match self.upload_file(dir, &name, &mut reader) {
                Ok(size) => UploadOutcome::stored(name, size),
                Err(e) => {
                    handle_error("upload", &e);
                    UploadOutcome::failed(name, &e)
                }
            })
            .collect();

        Ok(outcomes)
    }

    /// Stores one file, silently replacing an existing file of the same name.
    ///
    /// The data is synced to storage before this returns. An interrupted
    /// write can leave a partial file behind.
    pub fn upload_file(
        &self,
        dir: &ResolvedPath,
        filename: &str,
        reader: &mut impl Read,
    ) -> Result<u64, StorageError> {
        ensure_directory(dir)?;
        let target = self.resolver.resolve_child(dir, filename)?;

        if target.as_path().is_dir() {
            return Err(StorageError::IsADirectory(target.display_logical()));
        }

        let written = write_durably(target.as_path(), reader).map_err(|e| {
            error!("Failed to store {}: {}", target.display_logical(), e);
            StorageError::from(e)
        })?;

        info!("Stored {} ({} bytes)", target.display_logical(), written);
        Ok(written)
    }

    /// Creates an empty directory named `name` inside `dir`.
    pub fn mkdir(&self, dir: &ResolvedPath, name: &str) -> Result<ResolvedPath, StorageError> {
        ensure_directory(dir)?;
        let target = self.resolver.resolve_child(dir, name)?;

        match fs::create_dir(target.as_path()) {
            Ok(()) => {
                info!("Created directory {}", target.display_logical());
                Ok(target)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StorageError::AlreadyExists(target.display_logical()))
            }
            Err(e) => Err(StorageError::from(e)),
        }
    }

    /// Renames `old_name` to `new_name` within `dir`. Never overwrites.
    pub fn rename(
        &self,
        dir: &ResolvedPath,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError> {
        ensure_directory(dir)?;
        for name in [old_name, new_name] {
            if changes_parent(name) {
                return Err(StorageError::Unsupported(format!(
                    "moving {:?} across directories",
                    name
                )));
            }
        }

        let source = self.resolver.resolve_child(dir, old_name)?;
        let target = self.resolver.resolve_child(dir, new_name)?;

        if !entry_exists(source.as_path()) {
            return Err(StorageError::NotFound(source.display_logical()));
        }
        if entry_exists(target.as_path()) {
            return Err(StorageError::AlreadyExists(target.display_logical()));
        }

        fs::rename(source.as_path(), target.as_path())?;
        info!(
            "Renamed {} to {}",
            source.display_logical(),
            target.display_logical()
        );
        Ok(())
    }

    /// Deletes a file, symlink or empty directory named `name` inside `dir`.
    pub fn delete(&self, dir: &ResolvedPath, name: &str) -> Result<(), StorageError> {
        ensure_directory(dir)?;
        let target = self.resolver.resolve_child(dir, name)?;

        let metadata = match fs::symlink_metadata(target.as_path()) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(target.display_logical()));
            }
            Err(e) => return Err(StorageError::from(e)),
        };

        if metadata.is_dir() {
            if directory_has_entries(target.as_path())? {
                return Err(StorageError::DirectoryNotEmpty(target.display_logical()));
            }
            retry_on_permission_denied(|| fs::remove_dir(target.as_path())).map_err(|e| {
                if e.kind() == io::ErrorKind::DirectoryNotEmpty {
                    StorageError::DirectoryNotEmpty(target.display_logical())
                } else {
                    StorageError::from(e)
                }
            })?;
        } else {
            retry_on_permission_denied(|| fs::remove_file(target.as_path()))?;
        }

        info!("Deleted {}", target.display_logical());
        Ok(())
    }
}

fn stat(path: &ResolvedPath) -> Result<Metadata, StorageError> {
    fs::metadata(path.as_path()).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => StorageError::NotFound(path.display_logical()),
        _ => StorageError::from(e),
    })
}

fn ensure_directory(dir: &ResolvedPath) -> Result<(), StorageError> {
    if stat(dir)?.is_dir() {
        Ok(())
    } else {
        Err(StorageError::NotADirectory(dir.display_logical()))
    }
}

/// A name with more than one segment would move the entry to another parent.
fn changes_parent(name: &str) -> bool {
    name.split('/').filter(|s| !s.is_empty()).count() > 1
}
