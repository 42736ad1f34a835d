//! API responses
//!
//! JSON bodies and the error type returned by the HTTP handlers.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::StorageError;
use crate::error::handlers::{error_to_status, handle_error};

/// Body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// Errors a handler can return
#[derive(Debug)]
pub enum ApiError {
    Storage {
        operation: &'static str,
        error: StorageError,
    },
    Multipart(MultipartError),
}

impl ApiError {
    pub fn storage(operation: &'static str, error: StorageError) -> Self {
        ApiError::Storage { operation, error }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        ApiError::Multipart(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Storage { operation, error } => {
                handle_error(operation, &error);
                (
                    error_to_status(&error),
                    ErrorBody {
                        error: error.kind(),
                        message: error.public_message(),
                    },
                )
            }
            ApiError::Multipart(error) => (
                error.status(),
                ErrorBody {
                    error: "BadRequest",
                    message: error.body_text(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// `{"ok": true}`
pub fn ok() -> Json<Value> {
    Json(json!({ "ok": true }))
}

/// `Content-Disposition` value offering `file_name` as an attachment.
///
/// Carries an ASCII fallback plus the exact UTF-8 name in `filename*`.
pub fn attachment_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut encoded = String::with_capacity(file_name.len());
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
