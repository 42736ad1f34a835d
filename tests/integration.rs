use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tower::ServiceExt;

use file_manager::server::{AppState, build_router};
use file_manager::storage::{FileOps, PathResolver};

const BOUNDARY: &str = "fm-test-boundary";

struct TestApp {
    _temp: TempDir,
    root: PathBuf,
    router: Router,
}

// Helper to build a router over a scratch root with a tiny static UI
fn setup() -> TestApp {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("data");
    let static_dir = temp.path().join("static");
    fs::create_dir(&root).unwrap();
    fs::create_dir(&static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<html>file manager</html>").unwrap();

    let ops = FileOps::new(PathResolver::new(root.clone()));
    let router = build_router(AppState::new(ops), &static_dir, 1024 * 1024);
    TestApp {
        _temp: temp,
        root,
        router,
    }
}

// Helper to send a request and collect the whole response
async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

async fn send_json(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart(uri: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_list_root_shows_created_directory() {
    let app = setup();
    let (status, body) = send_json(&app, get("/api/list")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send_json(&app, post_json("/api/mkdir", json!({"path": "", "name": "x"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, body) = send_json(&app, get("/api/list?path=/")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "x");
    assert_eq!(entries[0]["kind"], "directory");
    assert_eq!(entries[0]["size"], Value::Null);
}

#[tokio::test]
async fn test_list_rejects_traversal() {
    let app = setup();
    for uri in [
        "/api/list?path=../../etc",
        "/api/list?path=%2e%2e%2f%2e%2e%2fetc",
        "/api/list?path=a/../..",
    ] {
        let (status, body) = send_json(&app, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "PathEscape", "{uri}");
    }
}

#[tokio::test]
async fn test_list_failure_mapping() {
    let app = setup();
    fs::write(app.root.join("a.txt"), b"a").unwrap();

    let (status, body) = send_json(&app, get("/api/list?path=missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, body) = send_json(&app, get("/api/list?path=a.txt")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NotADirectory");
}

#[tokio::test]
async fn test_error_messages_hide_physical_paths() {
    let app = setup();
    let root = app.root.to_string_lossy().to_string();
    let (_, _, body) = send(&app, get("/api/list?path=nested/missing")).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("nested/missing"));
    assert!(!text.contains(&root));
}

#[tokio::test]
async fn test_upload_overwrites_and_downloads() {
    let app = setup();
    fs::create_dir(app.root.join("docs")).unwrap();

    let (status, body) = send_json(
        &app,
        multipart("/api/upload?path=docs", &[("a.txt", &b"first"[..]), ("b.txt", &b"bee"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "a.txt");
    assert_eq!(body[0]["ok"], true);
    assert_eq!(body[1]["name"], "b.txt");
    assert_eq!(body[1]["ok"], true);

    let (status, _) = send_json(&app, multipart("/api/upload?path=docs", &[("a.txt", &b"second"[..])])).await;
    assert_eq!(status, StatusCode::OK);

    let (status, headers, body) = send(&app, get("/api/download?path=docs/a.txt")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"second");
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"a.txt\""));
}

#[tokio::test]
async fn test_upload_reports_per_file_outcomes() {
    let app = setup();
    let (status, body) = send_json(
        &app,
        multipart("/api/upload", &[("ok.txt", &b"1"[..]), ("..", &b"2"[..]), ("fine.txt", &b"3"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["ok"], true);
    assert_eq!(body[1]["ok"], false);
    assert_eq!(body[1]["error"], "InvalidName");
    assert_eq!(body[2]["ok"], true);
    assert!(app.root.join("fine.txt").is_file());
}

#[tokio::test]
async fn test_upload_target_must_be_directory() {
    let app = setup();
    fs::write(app.root.join("a.txt"), b"a").unwrap();

    let (status, body) = send_json(&app, multipart("/api/upload?path=a.txt", &[("b.txt", &b"b"[..])])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "NotADirectory");

    let (status, _) = send_json(&app, multipart("/api/upload?path=nowhere", &[("b.txt", &b"b"[..])])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_failure_mapping() {
    let app = setup();
    fs::create_dir(app.root.join("dir")).unwrap();

    let (status, body) = send_json(&app, get("/api/download?path=dir")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "IsADirectory");

    let (status, body) = send_json(&app, get("/api/download?path=ghost.txt")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, body) = send_json(&app, get("/api/download?path=../secret")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PathEscape");
}

#[tokio::test]
async fn test_mkdir_failure_mapping() {
    let app = setup();
    fs::create_dir(app.root.join("taken")).unwrap();

    let (status, body) = send_json(&app, post_json("/api/mkdir", json!({"name": "taken"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyExists");

    let (status, body) = send_json(&app, post_json("/api/mkdir", json!({"path": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidName");

    let (status, body) = send_json(&app, post_json("/api/mkdir", json!({"path": "", "name": "a/b"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "InvalidName");
}

#[tokio::test]
async fn test_rename_flow() {
    let app = setup();
    fs::create_dir(app.root.join("sub")).unwrap();
    fs::write(app.root.join("sub/a.txt"), b"a").unwrap();
    fs::write(app.root.join("sub/b.txt"), b"b").unwrap();

    let (status, body) = send_json(
        &app,
        post_json("/api/rename", json!({"path": "sub", "oldName": "a.txt", "newName": "b.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AlreadyExists");
    assert_eq!(fs::read(app.root.join("sub/a.txt")).unwrap(), b"a");

    let (status, body) = send_json(
        &app,
        post_json("/api/rename", json!({"path": "sub", "oldName": "a.txt", "newName": "../a.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported");

    let (status, body) = send_json(
        &app,
        post_json("/api/rename", json!({"path": "sub", "oldName": "nope", "newName": "c.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");

    let (status, _) = send_json(
        &app,
        post_json("/api/rename", json!({"path": "sub", "oldName": "a.txt", "newName": "c.txt"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(app.root.join("sub/c.txt").is_file());
    assert!(!app.root.join("sub/a.txt").exists());
}

#[tokio::test]
async fn test_delete_flow() {
    let app = setup();
    fs::create_dir(app.root.join("full")).unwrap();
    fs::write(app.root.join("full/keep.txt"), b"k").unwrap();
    fs::create_dir(app.root.join("empty")).unwrap();

    let (status, body) = send_json(&app, post_json("/api/delete", json!({"path": "", "name": "full"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DirectoryNotEmpty");
    assert!(app.root.join("full/keep.txt").is_file());

    let (status, _) = send_json(&app, post_json("/api/delete", json!({"path": "full", "name": "keep.txt"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&app, post_json("/api/delete", json!({"name": "empty"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.root.join("empty").exists());

    let (status, body) = send_json(&app, post_json("/api/delete", json!({"name": "empty"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_is_rejected_over_http() {
    let app = setup();
    let outside = TempDir::new().unwrap();
    fs::write(outside.path().join("secret.txt"), b"secret").unwrap();
    std::os::unix::fs::symlink(outside.path(), app.root.join("escape")).unwrap();

    let (status, body) = send_json(&app, get("/api/download?path=escape/secret.txt")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PathEscape");

    let (status, body) = send_json(&app, get("/api/list")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_static_ui_is_served_as_fallback() {
    let app = setup();
    let (status, _, body) = send(&app, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"<html>file manager</html>");
}
