#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use decode_service::services::providers::mock::MockTextProvider;
use decode_service::services::providers::{GenerationParams, TextProvider};
use decode_service::services::Decoder;
use decode_service::startup::{build_router, AppState};
use secrecy::Secret;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_API_KEY: &str = "sk-test-key";

/// Router backed by `provider`, with or without a credential.
pub fn router_with(provider: Arc<dyn TextProvider>, credential: Option<&str>) -> Router {
    let decoder = Decoder::new(
        provider,
        credential.map(|c| Secret::new(c.to_string())),
        GenerationParams::default(),
    );
    build_router(AppState::new(decoder))
}

pub fn mock_router(provider: MockTextProvider) -> Router {
    router_with(Arc::new(provider), Some(TEST_API_KEY))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

pub async fn send(app: Router, method: &str, uri: &str, body: &str) -> TestResponse {
    send_with_headers(app, method, uri, body, &[]).await
}

pub async fn send_with_headers(
    app: Router,
    method: &str,
    uri: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    TestResponse {
        status,
        content_type,
        headers,
        body,
    }
}
