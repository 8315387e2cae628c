//! Integration test harness for the RentalHub storefront.
//!
//! Each [`TestApp`] runs the full storefront router in-process, with an
//! in-memory session store and an `httpmock` server standing in for the
//! rental backend. Requests go through `tower::ServiceExt::oneshot`; the
//! storefront session cookie is carried between requests like a browser
//! would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rentalhub-integration-tests
//! ```
//!
//! No database is needed: the pool is created lazily and only the
//! readiness check touches it.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use httpmock::prelude::*;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::PgPool;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

use rentalhub_storefront::config::{BackendConfig, StorefrontConfig};
use rentalhub_storefront::content::ContentStore;
use rentalhub_storefront::middleware::session::SESSION_COOKIE_NAME;
use rentalhub_storefront::routes;
use rentalhub_storefront::state::AppState;

/// Client address sent on every request; the auth rate limiter keys on it.
const CLIENT_IP: &str = "203.0.113.7";

const MULTIPART_BOUNDARY: &str = "rentalhub-test-boundary";

/// A file part for [`TestApp::post_multipart`].
pub struct TestFile<'a> {
    pub field: &'a str,
    pub file_name: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

/// A response with its body read into a string.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` of a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The storefront under test plus its mock backend.
pub struct TestApp {
    pub backend: &'static MockServer,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Start a storefront pointed at a fresh mock backend.
    pub async fn spawn() -> Self {
        let backend: &'static MockServer = Box::leak(Box::new(MockServer::start_async().await));
        let config = test_config(backend);
        let pool = PgPool::connect_lazy("postgres://localhost/rentalhub_test").unwrap();
        let state = AppState::new(config, pool, ContentStore::default()).unwrap();
        let router = routes::app(state, MemoryStore::default());

        Self {
            backend,
            router,
            cookie: None,
        }
    }

    /// Forget the storefront session cookie.
    pub fn clear_cookies(&mut self) {
        self.cookie = None;
    }

    pub async fn get(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, Body::empty(), None, false).await
    }

    /// GET as HTMX does (`HX-Request: true`).
    pub async fn get_htmx(&mut self, path: &str) -> TestResponse {
        self.send(Method::GET, path, Body::empty(), None, true).await
    }

    /// POST an urlencoded form.
    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = encode_form(fields);
        self.send(
            Method::POST,
            path,
            Body::from(body),
            Some("application/x-www-form-urlencoded"),
            false,
        )
        .await
    }

    /// POST an urlencoded form as HTMX does.
    pub async fn post_form_htmx(&mut self, path: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = encode_form(fields);
        self.send(
            Method::POST,
            path,
            Body::from(body),
            Some("application/x-www-form-urlencoded"),
            true,
        )
        .await
    }

    /// POST a `multipart/form-data` body, as file-upload forms do.
    pub async fn post_multipart(
        &mut self,
        path: &str,
        fields: &[(&str, &str)],
        files: &[TestFile<'_>],
    ) -> TestResponse {
        let content_type = format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}");
        self.send(
            Method::POST,
            path,
            Body::from(encode_multipart(fields, files)),
            Some(&content_type),
            false,
        )
        .await
    }

    async fn send(
        &mut self,
        method: Method,
        path: &str,
        body: Body,
        content_type: Option<&str>,
        htmx: bool,
    ) -> TestResponse {
        let mut request = Request::builder()
            .method(method)
            .uri(path)
            .header("x-forwarded-for", CLIENT_IP);
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        if htmx {
            request = request.header("hx-request", "true");
        }

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let raw = value.to_str().unwrap();
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some((name, value)) = pair.split_once('=')
                && name == SESSION_COOKIE_NAME
            {
                self.cookie = (!value.is_empty()).then(|| pair.to_owned());
            }
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    // =========================================================================
    // Backend fixtures
    // =========================================================================

    /// Mock the backend's CSRF bootstrap.
    pub async fn mock_csrf(&self) {
        self.backend
            .mock_async(|when, then| {
                when.method(GET).path("/api/auth/csrf");
                then.status(200)
                    .header("Set-Cookie", "csrftoken=tok123; Path=/")
                    .json_body(json!({ "detail": "CSRF cookie set" }));
            })
            .await;
    }

    /// Mock a successful login returning `user`.
    pub async fn mock_login(&self, user: Value) {
        self.mock_csrf().await;
        self.backend
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/login/");
                then.status(200)
                    .header("Set-Cookie", "sessionid=sess456; Path=/; HttpOnly")
                    .json_body(user);
            })
            .await;
    }

    /// Sign in through the storefront's login form.
    pub async fn sign_in_as(&mut self, user: Value) -> TestResponse {
        self.mock_login(user).await;
        self.post_form(
            "/auth/login",
            &[("username", "asha"), ("password", "Secret123")],
        )
        .await
    }
}

/// A customer with a completed profile.
#[must_use]
pub fn customer() -> Value {
    json!({
        "id": 7,
        "username": "asha",
        "name": "Asha Rao",
        "email": "asha@example.com",
        "phone": "9876543210",
        "address": "12 Lake Road, Pune",
        "is_customer": true,
        "is_superuser": false
    })
}

/// A seller with a completed profile.
#[must_use]
pub fn seller() -> Value {
    json!({
        "id": 8,
        "username": "ravi",
        "name": "Ravi Kumar",
        "email": "ravi@example.com",
        "phone": "9123456780",
        "address": "4 Market Street, Pune",
        "is_customer": false,
        "is_superuser": false
    })
}

/// A product as the backend serializes it.
#[must_use]
pub fn product(id: i64, title: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "owner": owner,
        "title": title,
        "description": format!("{title} for rent"),
        "category": "audio",
        "price_per_day": "45.00",
        "price_unit": "day",
        "is_approved": true,
        "is_active": true
    })
}

fn test_config(backend: &MockServer) -> StorefrontConfig {
    let mut backend_config = BackendConfig::new(Url::parse(&backend.base_url()).unwrap());
    backend_config.page_size = 2;

    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/rentalhub_test"),
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 3000,
        base_url: "http://localhost:3000".to_owned(),
        session_secret: SecretString::from("q7Lm2Xv9Rt4Kp8Zw3Nb6Hc1Yd5Fg0Js"),
        backend: backend_config,
        razorpay_key_id: Some("rzp_test_key".to_owned()),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

fn encode_multipart(fields: &[(&str, &str)], files: &[TestFile<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for file in files {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                file.field, file.file_name, file.content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
