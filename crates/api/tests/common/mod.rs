#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use cards_api::config::ServerConfig;
use cards_api::router::build_app_router;
use cards_api::state::AppState;

const BOUNDARY: &str = "----cards-test-boundary";

/// Minimal PNG signature; enough for magic-byte detection.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

/// Translation resources shipped with the workspace.
pub fn shipped_locale_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../locale")
}

/// Build a test `ServerConfig` pointing at the given directories.
pub fn test_config(locale_dir: PathBuf, media_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        locale_dir,
        media_root,
        max_upload_bytes: 5 * 1024 * 1024,
        session_max_age_days: 14,
    }
}

/// A router over a test database with its own temporary media root.
///
/// Keep the value alive for the whole test; dropping it deletes the media
/// directory.
pub struct TestApp {
    pub pool: PgPool,
    pub media: TempDir,
    router: Router,
}

impl TestApp {
    pub fn new(pool: PgPool) -> Self {
        Self::with_locale_dir(pool, shipped_locale_dir())
    }

    pub fn with_locale_dir(pool: PgPool, locale_dir: PathBuf) -> Self {
        let media = tempfile::tempdir().expect("create media dir");
        let config = test_config(locale_dir, media.path().to_path_buf());
        let state = AppState {
            pool: pool.clone(),
            config: Arc::new(config.clone()),
        };
        Self {
            pool,
            media,
            router: build_app_router(state, &config),
        }
    }

    /// A fresh handle to the router, consumed by one request.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// A part of a `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

/// The standard valid person submission, with names overridable.
pub fn person_parts<'a>(last: &'a str, first: &'a str) -> Vec<Part<'a>> {
    vec![
        Part::Text("last_name", last),
        Part::Text("first_name", first),
        Part::Text("patronymic", ""),
        Part::Text("birth_date", "1990-01-01"),
    ]
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Send a GET request.
pub async fn get(app: Router, uri: &str) -> Response {
    get_with_cookie(app, uri, None).await
}

/// Send a GET request, optionally carrying a `Cookie` header.
pub async fn get_with_cookie(app: Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    app.oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

/// Send a `multipart/form-data` POST.
pub async fn post_multipart(app: Router, uri: &str, parts: &[Part<'_>]) -> Response {
    post_multipart_raw(app, uri, multipart_body(parts)).await
}

/// Send a POST declared as `multipart/form-data` with an arbitrary body.
pub async fn post_multipart_raw(app: Router, uri: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a POST with an empty body (delete confirmation).
pub async fn post_empty(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// The `sessionid=<key>` pair from a response's `Set-Cookie`, if any.
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("sessionid="))
        .map(str::to_string)
}

/// Label of a field in a form document (`data.form.fields[]`).
pub fn field_label(json: &serde_json::Value, name: &str) -> String {
    field(json, name)["label"].as_str().unwrap().to_string()
}

/// A field object in a form document.
pub fn field<'a>(json: &'a serde_json::Value, name: &str) -> &'a serde_json::Value {
    json["data"]["form"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == name)
        .unwrap_or_else(|| panic!("form has no field {name}"))
}
