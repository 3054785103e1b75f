//! HTTP-level tests for the decode endpoint, backed by the mock provider.

mod common;

use axum::http::StatusCode;
use common::{mock_router, router_with, send, send_with_headers};
use decode_service::services::providers::mock::{MockBehavior, MockTextProvider};
use decode_service::services::providers::ProviderError;
use decode_service::startup::{API_PATH, FUNCTION_PATH};
use std::sync::Arc;

#[tokio::test]
async fn cleared_to_land_is_explained() {
    let app = mock_router(MockTextProvider::replying(
        "This means the tower has given permission to land on runway 27.",
    ));

    let response = send(
        app,
        "POST",
        FUNCTION_PATH,
        r#"{"phrase": "cleared to land runway 27"}"#,
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(
        response.body,
        serde_json::json!({
            "explanation": "This means the tower has given permission to land on runway 27."
        })
    );
}

#[tokio::test]
async fn api_path_serves_the_same_handler() {
    let app = mock_router(MockTextProvider::replying("Stop before the runway."));
    let response = send(app, "POST", API_PATH, r#"{"phrase":"hold short"}"#).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["explanation"], "Stop before the runway.");
}

#[tokio::test]
async fn non_post_gets_json_405() {
    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let app = mock_router(MockTextProvider::default());
        let response = send(app, method, FUNCTION_PATH, "").await;

        assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED, "{}", method);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
        assert_eq!(
            response.body["error"],
            "Method Not Allowed. This function only accepts POST requests."
        );
    }
}

#[tokio::test]
async fn malformed_body_is_400() {
    for body in ["{phrase: roger}", "", r#"{"text":"roger"}"#, r#""roger""#] {
        let app = mock_router(MockTextProvider::default());
        let response = send(app, "POST", FUNCTION_PATH, body).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", body);
        assert_eq!(
            response.body["error"],
            "Invalid JSON format in request body or missing 'phrase'."
        );
    }
}

#[tokio::test]
async fn empty_phrase_is_400() {
    let app = mock_router(MockTextProvider::default());
    let response = send(app, "POST", FUNCTION_PATH, r#"{"phrase":""}"#).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "Missing 'phrase' in request body.");
}

#[tokio::test]
async fn falsy_phrase_is_reported_missing() {
    for body in [
        r#"{"phrase":false}"#,
        r#"{"phrase":0}"#,
        r#"{"phrase":[]}"#,
        r#"{"phrase":{}}"#,
    ] {
        let app = mock_router(MockTextProvider::default());
        let response = send(app, "POST", FUNCTION_PATH, body).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", body);
        assert_eq!(response.body["error"], "Missing 'phrase' in request body.");
    }
}

#[tokio::test]
async fn missing_credential_is_500_without_details() {
    let app = router_with(Arc::new(MockTextProvider::default()), None);
    let response = send(app, "POST", FUNCTION_PATH, r#"{"phrase":"go around"}"#).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.body["error"],
        "Server configuration error: API key not found. Please contact support."
    );
}

#[tokio::test]
async fn provider_failure_is_500_with_details() {
    let app = mock_router(MockTextProvider::failing(ProviderError::RateLimited(
        "OpenAI API error 429 Too Many Requests: You exceeded your current quota".to_string(),
    )));
    let response = send(app, "POST", FUNCTION_PATH, r#"{"phrase":"go around"}"#).await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.body["error"].as_str().unwrap();
    assert!(error.starts_with("Failed to get explanation from AI:"));
    assert!(error.ends_with("You exceeded your current quota"));
}

#[tokio::test]
async fn empty_model_output_is_200_with_fallback() {
    let app = mock_router(MockTextProvider::new(MockBehavior::Empty));
    let response = send(app, "POST", FUNCTION_PATH, r#"{"phrase":"say again"}"#).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["explanation"], "No explanation found.");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let app = mock_router(MockTextProvider::default());
    let response = send_with_headers(
        app,
        "POST",
        FUNCTION_PATH,
        r#"{"phrase":"roger"}"#,
        &[("x-request-id", "abc-123")],
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers.get("x-request-id").unwrap(), "abc-123");
    assert_eq!(
        response.headers.get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
