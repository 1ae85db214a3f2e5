/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory sheet store and offers small
/// helpers for JSON requests, registration, and login.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use clubtask_api::app::{build_router, AppState};
use clubtask_api::config::Config;
use clubtask_shared::store::{memory::MemorySheetStore, SheetStore};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context with a fresh store and router
pub struct TestContext {
    pub store: Arc<MemorySheetStore>,
    pub app: Router,
}

/// Builds the full router over `store` with the test secret
pub fn router(store: Arc<dyn SheetStore>) -> Router {
    let config = Config::from_lookup(|key| match key {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .unwrap();

    build_router(AppState::new(store, config))
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemorySheetStore::new());
        let app = router(store.clone());

        Self { store, app }
    }

    /// Sends a JSON request and returns the status and parsed body
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON response ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), None).await
    }

    pub async fn register(&self, name: &str, password: &str, role: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(json!({
                "name": name,
                "password": password,
                "confirm_password": password,
                "role": role,
            })),
        )
        .await
    }

    pub async fn try_login(&self, name: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(json!({ "name": name, "password": password })),
        )
        .await
    }

    /// Logs in and returns the access token
    pub async fn login(&self, name: &str, password: &str) -> String {
        let (status, body) = self.try_login(name, password).await;
        assert_eq!(status, StatusCode::OK, "login failed for {}: {}", name, body);
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Registers `name` and approves them as the parent Dev `Ada`
    pub async fn add_member(&self, dev_token: &str, name: &str, role: &str) {
        let (status, _) = self.register(name, "pw", role).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(&format!("/v1/members/{}/approve", name), dev_token)
            .await;
        assert_eq!(status, StatusCode::OK, "approve failed: {}", body);
    }

    /// Parent Dev `Ada` plus Core Head `Bo`, Domain Head `Cy` and Junior Head `Di`
    ///
    /// Returns Ada's access token. Every password is `pw`.
    pub async fn club(&self) -> String {
        let (status, _) = self.register("Ada", "pw", "Dev").await;
        assert_eq!(status, StatusCode::CREATED);

        let ada = self.login("Ada", "pw").await;
        self.add_member(&ada, "Bo", "Core Head").await;
        self.add_member(&ada, "Cy", "Domain Head").await;
        self.add_member(&ada, "Di", "Junior Head").await;
        ada
    }
}
