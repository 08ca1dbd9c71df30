//! Common test utilities for E2E testing with mocks.
//!
//! Builds an in-process server with a mock spreadsheet gateway and a fake
//! portal injected, so the full trigger flow runs without external
//! infrastructure.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use portico_core::{
    load_config_from_str,
    testing::{FakePortalDriver, FakePortalPage, MockSheetsGateway},
};

/// Re-export fixtures for test convenience
pub use portico_core::testing::fixtures;

/// The confirmation marker the fake portal shows on success.
pub const CONFIRMATION: &str = "Your order has been placed.";

/// The post-login landing page of the default portal config.
pub const DASHBOARD: &str = "https://order.harmonps.com/Dashboard/";

/// Test fixture for E2E testing with mock dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock gateway - configure rows, inspect writes
    pub gateway: Arc<MockSheetsGateway>,
    /// Fake page - inspect form interactions
    pub page: FakePortalPage,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Fixture whose portal logs in and confirms every order.
    pub fn new() -> Self {
        let page = FakePortalPage::new()
            .with_url_after_submit(DASHBOARD)
            .with_visible_text(CONFIRMATION);
        Self::with_page(page)
    }

    /// Fixture with a custom fake page.
    pub fn with_page(page: FakePortalPage) -> Self {
        let config = load_config_from_str(
            r#"
[sheets]
spreadsheet_id = "sheet-123"
token = "test-token"

[portal]
password = "test-password"
settle_ms = 0
"#,
        )
        .expect("test config");

        let gateway = Arc::new(MockSheetsGateway::new());
        let driver = Arc::new(FakePortalDriver::new(page.clone()));

        let state = Arc::new(portico_server::state::AppState::new(
            config,
            Arc::clone(&gateway) as Arc<dyn portico_core::SheetsGateway>,
            driver as Arc<dyn portico_core::PortalDriver>,
        ));

        let router = portico_server::api::create_router(state);

        Self {
            router,
            gateway,
            page,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a raw body (for malformed payloads).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body collect failed")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
