//! Error types
//!
//! Defines the storage error taxonomy returned by path resolution and file
//! operations, and the umbrella error used during server startup.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Storage module errors
///
/// Every variant except `IoError` carries the caller's logical path or name,
/// never a physical path, so the `Display` text is safe to return to clients.
#[derive(Debug)]
pub enum StorageError {
    PathEscape(String),
    NotFound(String),
    NotADirectory(String),
    IsADirectory(String),
    AlreadyExists(String),
    DirectoryNotEmpty(String),
    Unsupported(String),
    InvalidName(String),
    IoError(io::Error),
}

impl StorageError {
    /// Stable kind identifier used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::PathEscape(_) => "PathEscape",
            StorageError::NotFound(_) => "NotFound",
            StorageError::NotADirectory(_) => "NotADirectory",
            StorageError::IsADirectory(_) => "IsADirectory",
            StorageError::AlreadyExists(_) => "AlreadyExists",
            StorageError::DirectoryNotEmpty(_) => "DirectoryNotEmpty",
            StorageError::Unsupported(_) => "Unsupported",
            StorageError::InvalidName(_) => "InvalidName",
            StorageError::IoError(_) => "Internal",
        }
    }

    /// Message suitable for clients. I/O details stay server-side.
    pub fn public_message(&self) -> String {
        match self {
            StorageError::IoError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PathEscape(p) => write!(f, "Path escapes the sandbox root: {}", p),
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::IsADirectory(p) => write!(f, "Is a directory: {}", p),
            StorageError::AlreadyExists(p) => write!(f, "Already exists: {}", p),
            StorageError::DirectoryNotEmpty(p) => write!(f, "Directory not empty: {}", p),
            StorageError::Unsupported(p) => write!(f, "Unsupported operation: {}", p),
            StorageError::InvalidName(p) => write!(f, "Invalid name: {:?}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Errors that abort server startup
#[derive(Debug)]
pub enum FileManagerError {
    Config(config::ConfigError),
    RootUnavailable(PathBuf, String),
    Bind(String, io::Error),
    IoError(io::Error),
}

impl fmt::Display for FileManagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileManagerError::Config(e) => write!(f, "Configuration error: {}", e),
            FileManagerError::RootUnavailable(path, reason) => {
                write!(f, "Root directory {} unavailable: {}", path.display(), reason)
            }
            FileManagerError::Bind(addr, e) => write!(f, "Failed to bind to {}: {}", addr, e),
            FileManagerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for FileManagerError {}

impl From<config::ConfigError> for FileManagerError {
    fn from(error: config::ConfigError) -> Self {
        FileManagerError::Config(error)
    }
}

impl From<io::Error> for FileManagerError {
    fn from(error: io::Error) -> Self {
        FileManagerError::IoError(error)
    }
}
