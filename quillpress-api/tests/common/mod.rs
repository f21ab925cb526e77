//! Common test utilities for integration tests
//!
//! Every context runs the full router against a fresh in-memory store, so
//! tests are isolated and need no database.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use quillpress_api::app::{build_router, AppState};
use quillpress_api::config::Config;
use quillpress_shared::store::memory::MemoryStore;
use serde_json::{json, Value};
use tower::ServiceExt;

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

/// Status and parsed JSON body (Null when the body is empty or not JSON)
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(Config {
            jwt: quillpress_api::config::JwtConfig {
                secret: "test-secret".to_string(),
                expire_hours: 24,
            },
            ..Default::default()
        })
    }

    pub fn with_config(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        let app = build_router(state.clone());

        Self { app, store, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Registers `username` and returns its token
    pub async fn register(&self, username: &str) -> String {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": "password123",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);

        response.body["token"].as_str().unwrap().to_string()
    }

    /// Creates an article and returns its detail body
    pub async fn create_article(&self, token: &str, body: Value) -> Value {
        let response = self.post("/api/articles", Some(token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

pub fn article(slug: &str, published: bool) -> Value {
    json!({
        "title": format!("Title of {}", slug),
        "slug": slug,
        "content": format!("Content of {}", slug),
        "published": published,
    })
}
