//! Integration tests for the TaskMaster admin.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taskmaster-integration-tests
//! ```
//!
//! The full router runs in-process against the fake backends from
//! `taskmaster_admin::fake`; no network access is needed.
//!
//! # Test Categories
//!
//! - `admin_auth` - Login, session and password rotation
//! - `admin_collections` - Users, bookings and messages
//! - `admin_banners` - Banner records and images
//! - `admin_content` - FAQs and dashboard statistics

#![allow(clippy::missing_panics_doc)]

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use taskmaster_admin::config::{AdminConfig, FirebaseConfig};
use taskmaster_admin::fake::FakeBackends;
use taskmaster_admin::state::AppState;

/// Email of the admin account created by [`TestApp::signed_in`].
pub const ADMIN_EMAIL: &str = "admin@taskmaster.test";

/// Password of the admin account created by [`TestApp::signed_in`].
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// Boundary used by [`multipart_body`].
const BOUNDARY: &str = "taskmaster-test-boundary";

/// Largest response body the tests read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Configuration for an in-process admin; no backend URL is ever dialled.
#[must_use]
pub fn test_config() -> AdminConfig {
    AdminConfig {
        host: [127, 0, 0, 1].into(),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        session_secret: SecretString::from("k3Vq9ZpR7wXy2LmN8bTf4HsJ6dGc1AeU".to_string()),
        mirror_ttl: Duration::from_secs(60),
        firebase: FirebaseConfig {
            database_url: "https://taskmaster-test.firebaseio.test".to_string(),
            database_secret: SecretString::from("unused".to_string()),
            storage_bucket: "fake-bucket".to_string(),
            storage_token: None,
            api_key: SecretString::from("unused".to_string()),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
        tls: None,
    }
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    /// JSON body; `Null` when empty, a string when not JSON.
    pub body: Value,
    /// `name=value` part of the session cookie, if one was set.
    pub cookie: Option<String>,
}

impl TestResponse {
    /// The `error` message of an error body.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// The admin router wired to fake backends, with an optional session.
pub struct TestApp {
    router: Router,
    /// The fakes behind the router, for seeding and inspection.
    pub fakes: FakeBackends,
    cookie: Option<String>,
}

impl TestApp {
    /// Build the app over a document store seeded from `root`.
    #[must_use]
    pub fn new(root: Value) -> Self {
        let fakes = FakeBackends::with_root(root);
        let state = AppState::new(test_config(), fakes.clone().into());
        Self {
            router: taskmaster_admin::app(state),
            fakes,
            cookie: None,
        }
    }

    /// Build the app and sign in as [`ADMIN_EMAIL`].
    pub async fn signed_in(root: Value) -> Self {
        let mut app = Self::new(root);
        app.fakes.identity.add_account(ADMIN_EMAIL, ADMIN_PASSWORD);
        let response = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
        app
    }

    /// Post credentials to `/auth/login`, keeping the session cookie on success.
    pub async fn login(&mut self, email: &str, password: &str) -> TestResponse {
        let response = self
            .json(
                Method::POST,
                "/auth/login",
                &serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        if response.status == StatusCode::OK {
            self.cookie.clone_from(&response.cookie);
        }
        response
    }

    /// Forget the session cookie.
    pub fn drop_session(&mut self) {
        self.cookie = None;
    }

    /// Send a request, attaching the session cookie.
    pub async fn send(&self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request.headers_mut().insert(
                header::COOKIE,
                cookie.parse().expect("cookie is a valid header value"),
            );
        }

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("body is readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            body,
            cookie,
        }
    }

    /// Send a bodiless request.
    pub async fn call(&self, method: Method, uri: &str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("request is valid");
        self.send(request).await
    }

    /// GET `uri`.
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.call(Method::GET, uri).await
    }

    /// Send a JSON body.
    pub async fn json(&self, method: Method, uri: &str, body: &Value) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request is valid");
        self.send(request).await
    }

    /// Send a multipart form built by [`multipart_body`].
    pub async fn multipart(&self, method: Method, uri: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("request is valid");
        self.send(request).await
    }
}

/// An uploaded file for [`multipart_body`].
pub struct FilePart<'a> {
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// Encode text fields and an optional `image` file as multipart form data.
#[must_use]
pub fn multipart_body(fields: &[(&str, &str)], image: Option<FilePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
