//! HTTP handlers for the file manager API.
//!
//! Each handler extracts the caller's logical path and names, then runs the
//! resolution and the storage operation together on the blocking pool.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Query, Request, State};
use axum::http::HeaderValue;
use axum::http::header::CONTENT_DISPOSITION;
use axum::response::Response;
use serde::Deserialize;
use serde_json::Value;
use std::io::{self, Cursor};
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::error::StorageError;
use crate::server::responses::{ApiError, attachment_disposition, ok};
use crate::storage::{Entry, FileOps, UploadOutcome};

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub ops: FileOps,
}

impl AppState {
    pub fn new(ops: FileOps) -> Self {
        Self { ops }
    }
}

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub path: String,
}

/// Body of `/api/mkdir` and `/api/delete`
#[derive(Debug, Deserialize)]
pub struct NameRequest {
    #[serde(default)]
    pub path: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    #[serde(default)]
    pub path: String,
    pub old_name: Option<String>,
    pub new_name: Option<String>,
}

/// Run a storage call on the blocking pool.
async fn run_blocking<T, F>(operation: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(|e| ApiError::storage(operation, e)),
        Err(e) => Err(ApiError::storage(
            operation,
            StorageError::IoError(io::Error::other(format!("worker task failed: {e}"))),
        )),
    }
}

/// GET /api/list?path=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let ops = state.ops;
    let entries = run_blocking("list", move || {
        let dir = ops.resolver().resolve(&query.path)?;
        ops.list(&dir)
    })
    .await?;
    Ok(Json(entries))
}

/// GET /api/download?path=
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
    request: Request,
) -> Result<Response, ApiError> {
    let ops = state.ops;
    let download = run_blocking("download", move || {
        let file = ops.resolver().resolve(&query.path)?;
        ops.download(&file)
    })
    .await?;

    let response = match ServeFile::new(download.path.as_path()).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let mut response = response.map(Body::new);

    if let Ok(value) = HeaderValue::from_str(&attachment_disposition(&download.file_name)) {
        response.headers_mut().insert(CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// POST /api/upload?path= with multipart file parts
pub async fn upload(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<Vec<UploadOutcome>>, ApiError> {
    let mut files: Vec<(String, Cursor<Bytes>)> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        // Plain form fields carry no file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        files.push((file_name, Cursor::new(data)));
    }

    let ops = state.ops;
    let outcomes = run_blocking("upload", move || {
        let dir = ops.resolver().resolve(&query.path)?;
        ops.upload(&dir, files)
    })
    .await?;
    Ok(Json(outcomes))
}

/// POST /api/mkdir with `{path, name}`
pub async fn mkdir(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<Json<Value>, ApiError> {
    let ops = state.ops;
    let name = body.name.unwrap_or_default();
    run_blocking("mkdir", move || {
        let dir = ops.resolver().resolve(&body.path)?;
        ops.mkdir(&dir, &name).map(|_| ())
    })
    .await?;
    Ok(ok())
}

/// POST /api/rename with `{path, oldName, newName}`
pub async fn rename(
    State(state): State<AppState>,
    Json(body): Json<RenameRequest>,
) -> Result<Json<Value>, ApiError> {
    let ops = state.ops;
    let old_name = body.old_name.unwrap_or_default();
    let new_name = body.new_name.unwrap_or_default();
    run_blocking("rename", move || {
        let dir = ops.resolver().resolve(&body.path)?;
        ops.rename(&dir, &old_name, &new_name)
    })
    .await?;
    Ok(ok())
}

/// POST /api/delete with `{path, name}`
pub async fn delete(
    State(state): State<AppState>,
    Json(body): Json<NameRequest>,
) -> Result<Json<Value>, ApiError> {
    let ops = state.ops;
    let name = body.name.unwrap_or_default();
    run_blocking("delete", move || {
        let dir = ops.resolver().resolve(&body.path)?;
        ops.delete(&dir, &name)
    })
    .await?;
    Ok(ok())
}
