//! Shared helpers for driving the router in-process
#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::Value;
use social_api::{AppState, app, config::Config};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";
pub const FILES_URL: &str = "http://files.test/file";
const BOUNDARY: &str = "----socialtestboundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub uploads: TempDir,
}

/// A registered user and its bearer token (already `Bearer `-prefixed)
pub struct TestUser {
    pub id: String,
    pub token: String,
}

pub fn test_config(uploads: &TempDir) -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: SECRET.into(),
        session_lifetime: Duration::hours(1),
        files_url: FILES_URL.into(),
        uploads_dir: uploads.path().to_path_buf(),
        bcrypt_cost: 4,
        max_upload_bytes: 1024 * 1024,
        login_attempts_per_minute: 3,
    }
}

impl TestApp {
    pub fn new() -> Self {
        let uploads = tempfile::tempdir().expect("Failed to create upload dir");
        let state = AppState::new(test_config(&uploads));

        Self {
            router: app(state.clone()),
            state,
            uploads,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Bytes) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        (status, bytes)
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, token);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };
        (status, value)
    }

    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        contents: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::PUT)
            .uri(uri)
            .header(header::AUTHORIZATION, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let (status, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response is not JSON")
        };
        (status, value)
    }

    pub async fn register(&self, handle: &str) -> TestUser {
        let (status, body) = self
            .json(
                Method::POST,
                "/users",
                None,
                Some(serde_json::json!({
                    "name": format!("{handle} name"),
                    "user": handle,
                    "password": "secret123",
                    "password_confirmation": "secret123"
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {body}");

        TestUser {
            id: body["user"]["id"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_post(&self, author: &TestUser, description: &str) -> String {
        let (status, body) = self
            .json(
                Method::POST,
                "/posts",
                Some(&author.token),
                Some(serde_json::json!({ "description": description })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create post failed: {body}");
        body["id"].as_str().unwrap().to_string()
    }

    pub fn upload_names(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.uploads.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
