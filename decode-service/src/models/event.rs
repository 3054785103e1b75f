//! Serverless-style request and response records.
//!
//! The decoder consumes a [`FunctionEvent`] and produces a
//! [`FunctionResponse`], the same shapes a functions runtime hands to a
//! handler. The HTTP adapter converts axum requests into events.

use crate::error::DecodeError;
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Inbound invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionEvent {
    pub http_method: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub path: String,
}

impl FunctionEvent {
    pub fn new(http_method: impl Into<String>, body: Option<String>) -> Self {
        Self {
            http_method: http_method.into(),
            body,
            is_base64_encoded: false,
            headers: HashMap::new(),
            path: String::new(),
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self::new("POST", Some(body.into()))
    }

    /// The body as text, base64-decoded when the runtime flagged it.
    pub fn decoded_body(&self) -> Result<Option<String>, DecodeError> {
        let Some(body) = &self.body else {
            return Ok(None);
        };

        if !self.is_base64_encoded {
            return Ok(Some(body.clone()));
        }

        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|_| DecodeError::InvalidBody)?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| DecodeError::InvalidBody)
    }
}

/// Outbound result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

#[derive(Serialize)]
struct ExplanationBody<'a> {
    explanation: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl FunctionResponse {
    pub fn json<T: Serialize>(status_code: u16, payload: &T) -> Self {
        // Plain structs of strings always serialize.
        let body = serde_json::to_string(payload).unwrap_or_else(|_| "{}".to_string());

        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());

        Self {
            status_code,
            headers,
            body,
        }
    }

    pub fn explanation(text: &str) -> Self {
        Self::json(200, &ExplanationBody { explanation: text })
    }

    pub fn error(status_code: u16, message: &str) -> Self {
        Self::json(status_code, &ErrorBody { error: message })
    }
}

impl From<DecodeError> for FunctionResponse {
    fn from(err: DecodeError) -> Self {
        FunctionResponse::error(err.status_code().as_u16(), &err.client_message())
    }
}

impl IntoResponse for FunctionResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                header::HeaderName::try_from(name.as_str()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_from_runtime_json() {
        let event: FunctionEvent = serde_json::from_str(
            r#"{"httpMethod":"POST","body":"{\"phrase\":\"roger\"}","isBase64Encoded":false}"#,
        )
        .unwrap();

        assert_eq!(event.http_method, "POST");
        assert_eq!(event.body.as_deref(), Some(r#"{"phrase":"roger"}"#));
        assert!(event.headers.is_empty());
    }

    #[test]
    fn base64_body_is_decoded() {
        let mut event = FunctionEvent::post(STANDARD.encode(r#"{"phrase":"wilco"}"#));
        event.is_base64_encoded = true;

        assert_eq!(
            event.decoded_body().unwrap().as_deref(),
            Some(r#"{"phrase":"wilco"}"#)
        );
    }

    #[test]
    fn broken_base64_body_is_invalid() {
        let mut event = FunctionEvent::post("%%%not base64%%%");
        event.is_base64_encoded = true;

        assert_eq!(event.decoded_body(), Err(DecodeError::InvalidBody));
    }

    #[test]
    fn responses_are_json_with_content_type() {
        let response = FunctionResponse::explanation("Go around.");
        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Content-Type"], "application/json");
        assert_eq!(response.body, r#"{"explanation":"Go around."}"#);

        let response = FunctionResponse::error(405, "nope");
        assert_eq!(response.body, r#"{"error":"nope"}"#);
    }

    #[test]
    fn response_serializes_in_runtime_shape() {
        let json = serde_json::to_value(FunctionResponse::error(400, "bad")).unwrap();
        assert_eq!(json["statusCode"], 400);
        assert_eq!(json["headers"]["Content-Type"], "application/json");
        assert_eq!(json["body"], r#"{"error":"bad"}"#);
    }

    #[test]
    fn converts_into_http_response() {
        let response = FunctionResponse::error(405, "nope").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
