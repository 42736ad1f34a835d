//! Error handlers
//!
//! Maps storage errors onto HTTP status codes and logs them with the
//! severity they deserve.

use crate::error::types::StorageError;
use axum::http::StatusCode;
use log::{debug, error, warn};

/// Log a storage error raised while serving `operation`.
pub fn handle_error(operation: &str, err: &StorageError) {
    match err {
        StorageError::PathEscape(p) => {
            warn!("Rejected {} outside sandbox root (possible probe): {:?}", operation, p);
        }
        StorageError::IoError(e) => {
            error!("{} failed with I/O error: {:?}", operation, e);
        }
        other => debug!("{} failed: {}", operation, other),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::PathEscape(_) => StatusCode::BAD_REQUEST,
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::NotADirectory(_) => StatusCode::BAD_REQUEST,
        StorageError::IsADirectory(_) => StatusCode::BAD_REQUEST,
        StorageError::AlreadyExists(_) => StatusCode::CONFLICT,
        StorageError::DirectoryNotEmpty(_) => StatusCode::CONFLICT,
        StorageError::Unsupported(_) => StatusCode::BAD_REQUEST,
        StorageError::InvalidName(_) => StatusCode::BAD_REQUEST,
        StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
