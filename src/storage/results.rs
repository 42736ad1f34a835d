//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::fs::Metadata;

use crate::error::StorageError;
use crate::storage::filesystem::modified_secs;
use crate::storage::validation::ResolvedPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One item of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes; `None` for directories.
    pub size: Option<u64>,
    /// Seconds since the Unix epoch.
    pub modified: u64,
}

impl Entry {
    pub fn from_metadata(name: String, metadata: &Metadata) -> Self {
        let (kind, size) = if metadata.is_dir() {
            (EntryKind::Directory, None)
        } else {
            (EntryKind::File, Some(metadata.len()))
        };
        Self {
            name,
            kind,
            size,
            modified: modified_secs(metadata),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A file ready to be streamed to a client
#[derive(Debug, Clone)]
pub struct Download {
    pub path: ResolvedPath,
    pub file_name: String,
    pub size: u64,
    pub modified: u64,
}

/// Result of storing one uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadOutcome {
    pub name: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl UploadOutcome {
    pub fn stored(name: String, size: u64) -> Self {
        Self {
            name,
            ok: true,
            size: Some(size),
            error: None,
            message: None,
        }
    }

    pub fn failed(name: String, err: &StorageError) -> Self {
        Self {
            name,
            ok: false,
            size: None,
            error: Some(err.kind().to_string()),
            message: Some(err.public_message()),
        }
    }
}
